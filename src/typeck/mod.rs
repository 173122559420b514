pub mod builtins;
pub mod env;
pub mod expr;
pub mod scope;
pub mod types;

mod check;
mod infer;

pub use check::check_class;
pub use env::{Klass, KlassHead, Member, MemberRef, Method};
pub use scope::{BaseScope, ClassTable, ImportBinding, ImportBindings};
pub use types::{ClassRef, Ty};
