//! Static index of the route handlers declared in an application's sources.
//!
//! Handlers are either inherent/trait methods, named `Type@method`, or free
//! functions, named by their function name. Every declaration is recorded
//! with its module path: the file's path below the source root followed by
//! any inline `mod` blocks. An identifier may carry a module path prefix
//! (`http::UserController@show`, `handlers::list_users`); it matches every
//! declaration whose path ends with the given segments and must match exactly
//! one of them.

use crate::error::{Error, Result};
use crate::parser::{SourceFile, SourceParser};
use crate::scanner::SourceScanner;
use log::debug;
use std::path::{Component, Path, PathBuf};
use syn::visit::Visit;

/// What the sources declare about one handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerDecl {
    /// Module the handler is declared in, outermost first
    pub module_path: Vec<String>,
    /// Implementing type for methods, `None` for free functions
    pub owner: Option<String>,
    pub name: String,
    /// Raw doc comment text, one line per `///` line
    pub doc: String,
    /// One entry per declared parameter (receiver excluded), in declaration
    /// order. Each entry lists the type names the parameter mentions, outer
    /// type first: `Json<CreateUser>` gives `["Json", "CreateUser"]`.
    pub parameter_types: Vec<Vec<String>>,
    /// File the handler was found in
    pub file: PathBuf,
}

impl HandlerDecl {
    /// Fully qualified identifier, e.g. `http::users::UserController@show`.
    pub fn qualified_name(&self) -> String {
        let mut segments = self.module_path.clone();
        match &self.owner {
            Some(owner) => segments.push(method_key(owner, &self.name)),
            None => segments.push(self.name.clone()),
        }
        segments.join("::")
    }
}

/// A type that can own handler methods.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TypeDecl {
    module_path: Vec<String>,
    name: String,
}

/// Handler declarations with their module paths.
#[derive(Debug, Default)]
pub struct HandlerIndex {
    handlers: Vec<HandlerDecl>,
    types: Vec<TypeDecl>,
}

impl HandlerIndex {
    /// Indexes already parsed sources. Module paths start from each file's
    /// path as recorded in the [`SourceFile`].
    pub fn from_sources(sources: &[SourceFile]) -> Self {
        Self::index_sources(sources, None)
    }

    /// Scans, parses and indexes every source file below `root`.
    pub fn from_directory(root: &Path, skipped_dirs: &[String]) -> Result<Self> {
        let scanner = skipped_dirs
            .iter()
            .fold(SourceScanner::new(root), |scanner, dir| scanner.skip_dir(dir.clone()));
        let scan = scanner.scan().map_err(|e| Error::InvalidArgument(format!("{:#}", e)))?;
        let sources = SourceParser::parse_files(&scan.source_files);
        Ok(Self::index_sources(&sources, Some(root)))
    }

    fn index_sources(sources: &[SourceFile], root: Option<&Path>) -> Self {
        let mut index = Self::default();
        for source in sources {
            let mut visitor = HandlerVisitor {
                index: &mut index,
                file: &source.path,
                module_path: file_module_path(&source.path, root),
            };
            visitor.visit_file(&source.syntax_tree);
        }
        debug!(
            "Indexed {} handlers across {} types",
            index.handlers.len(),
            index.types.len()
        );
        index
    }

    /// Resolves a handler identifier to its declaration.
    ///
    /// # Errors
    ///
    /// [`Error::HandlerResolution`] if the type, method or function does not
    /// exist in the indexed sources, or if the identifier matches more than
    /// one declaration.
    pub fn resolve(&self, handler: &str) -> Result<&HandlerDecl> {
        let candidates: Vec<&HandlerDecl> = match handler.split_once('@') {
            Some((owner, method)) => {
                let owner_path = path_segments(owner);
                let Some((owner_name, qualifier)) = owner_path.split_last() else {
                    return Err(Error::handler_resolution(handler, "missing type name"));
                };
                let method = method.trim();

                let declared = self.types.iter().any(|decl| {
                    decl.name == *owner_name && ends_with(&decl.module_path, qualifier)
                });
                if !declared {
                    return Err(Error::handler_resolution(
                        handler,
                        format!("type `{}` is not declared in the indexed sources", owner),
                    ));
                }

                let candidates: Vec<&HandlerDecl> = self
                    .handlers
                    .iter()
                    .filter(|decl| {
                        decl.owner.as_deref() == Some(*owner_name)
                            && decl.name == method
                            && ends_with(&decl.module_path, qualifier)
                    })
                    .collect();
                if candidates.is_empty() {
                    return Err(Error::handler_resolution(
                        handler,
                        format!("`{}` has no method `{}`", owner_name, method),
                    ));
                }
                candidates
            }
            None => {
                let path = path_segments(handler);
                let Some((name, qualifier)) = path.split_last() else {
                    return Err(Error::handler_resolution(handler, "missing function name"));
                };
                self.handlers
                    .iter()
                    .filter(|decl| {
                        decl.owner.is_none()
                            && decl.name == *name
                            && ends_with(&decl.module_path, qualifier)
                    })
                    .collect()
            }
        };

        match candidates.as_slice() {
            [decl] => Ok(*decl),
            [] => Err(Error::handler_resolution(
                handler,
                "no function with this name in the indexed sources",
            )),
            _ => {
                let matches: Vec<String> =
                    candidates.iter().map(|decl| decl.qualified_name()).collect();
                Err(Error::handler_resolution(
                    handler,
                    format!(
                        "ambiguous, matches {}; qualify it with its module path",
                        matches.join(", ")
                    ),
                ))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

fn method_key(owner: &str, method: &str) -> String {
    format!("{}@{}", owner, method)
}

/// Splits `crate::a::B` into `["a", "B"]`.
fn path_segments(path: &str) -> Vec<&str> {
    let segments: Vec<&str> = path.split("::").map(str::trim).collect();
    match segments.first() {
        Some(&"crate") => segments[1..].to_vec(),
        _ => segments,
    }
}

fn ends_with(module_path: &[String], qualifier: &[&str]) -> bool {
    module_path.len() >= qualifier.len()
        && module_path[module_path.len() - qualifier.len()..]
            .iter()
            .zip(qualifier)
            .all(|(segment, wanted)| segment.as_str() == *wanted)
}

/// Module path a file contributes: its directories below `root` and its
/// stem, with `mod.rs`, `lib.rs` and `main.rs` adding no segment of their own.
fn file_module_path(file: &Path, root: Option<&Path>) -> Vec<String> {
    let relative = root
        .and_then(|root| file.strip_prefix(root).ok())
        .unwrap_or(file);

    let mut segments: Vec<String> = relative
        .with_extension("")
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if matches!(
        segments.last().map(String::as_str),
        Some("mod" | "lib" | "main")
    ) {
        segments.pop();
    }
    segments
}

struct HandlerVisitor<'a> {
    index: &'a mut HandlerIndex,
    file: &'a Path,
    module_path: Vec<String>,
}

impl HandlerVisitor<'_> {
    fn declare_type(&mut self, name: String) {
        let decl = TypeDecl {
            module_path: self.module_path.clone(),
            name,
        };
        if !self.index.types.contains(&decl) {
            self.index.types.push(decl);
        }
    }

    fn declare(&mut self, owner: Option<String>, sig: &syn::Signature, attrs: &[syn::Attribute]) {
        let parameter_types = sig
            .inputs
            .iter()
            .filter_map(|input| match input {
                syn::FnArg::Typed(pat_type) => {
                    let mut names = Vec::new();
                    collect_type_names(&pat_type.ty, &mut names);
                    Some(names)
                }
                syn::FnArg::Receiver(_) => None,
            })
            .collect();

        self.index.handlers.push(HandlerDecl {
            module_path: self.module_path.clone(),
            owner,
            name: sig.ident.to_string(),
            doc: doc_comment(attrs),
            parameter_types,
            file: self.file.to_path_buf(),
        });
    }
}

// Function bodies are never entered: only module-level items are handlers.
impl<'ast> Visit<'ast> for HandlerVisitor<'_> {
    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        self.module_path.push(node.ident.to_string());
        syn::visit::visit_item_mod(self, node);
        self.module_path.pop();
    }

    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        self.declare_type(node.ident.to_string());
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        self.declare_type(node.ident.to_string());
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.declare(None, &node.sig, &node.attrs);
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let owner = match &*node.self_ty {
            syn::Type::Path(type_path) => type_path
                .path
                .segments
                .last()
                .map(|segment| segment.ident.to_string()),
            _ => None,
        };

        if let Some(owner) = owner {
            self.declare_type(owner.clone());
            for item in &node.items {
                if let syn::ImplItem::Fn(method) = item {
                    self.declare(Some(owner.clone()), &method.sig, &method.attrs);
                }
            }
        }
    }

    fn visit_block(&mut self, _node: &'ast syn::Block) {}
}

/// Joins the `#[doc = "..."]` attributes (`///` lines) into one string.
fn doc_comment(attrs: &[syn::Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            syn::Meta::NameValue(name_value) => match &name_value.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(text),
                    ..
                }) => Some(text.value()),
                _ => None,
            },
            _ => None,
        })
        .flat_map(|text| {
            text.split('\n')
                .map(|line| line.strip_prefix(' ').unwrap_or(line).trim_end().to_string())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collects every named type a parameter type mentions, outer first.
fn collect_type_names(ty: &syn::Type, names: &mut Vec<String>) {
    match ty {
        syn::Type::Reference(reference) => collect_type_names(&reference.elem, names),
        syn::Type::Paren(paren) => collect_type_names(&paren.elem, names),
        syn::Type::Group(group) => collect_type_names(&group.elem, names),
        syn::Type::Tuple(tuple) => {
            for elem in &tuple.elems {
                collect_type_names(elem, names);
            }
        }
        syn::Type::Path(type_path) => {
            if let Some(segment) = type_path.path.segments.last() {
                names.push(segment.ident.to_string());
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    for arg in &args.args {
                        if let syn::GenericArgument::Type(inner) = arg {
                            collect_type_names(inner, names);
                        }
                    }
                }
            }
        }
        _ => {}
    }
}
