use alloc::{string::String, vec::Vec};

use super::instantiate::InstantiateErrorKind;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Invalid binding name {name:?}: expected a non-empty name without whitespace or ':'")]
    InvalidName { name: String },
    #[error("Target [{name}] is not instantiable")]
    NotInstantiable { name: String },
    #[error("Type [{name}] is not defined")]
    UnknownType { name: String },
    #[error("Unresolvable dependency resolving [{parameter}] in [{owner}]")]
    UnresolvableDependency { parameter: String, owner: String },
    #[error("Target [{target}] is not callable")]
    NotCallable { target: String },
    #[error("Cyclic dependency: {}", chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },
    #[error("Incorrect instance type of [{name}]. Actual: {actual}, expected: {expected}")]
    IncorrectType {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error(transparent)]
    Instantiate(#[from] InstantiateErrorKind),
}
