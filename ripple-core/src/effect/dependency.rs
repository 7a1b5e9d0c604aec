//! Effect dependencies.
//!
//! A dependency is a small value with well-defined equality. Plain values
//! compare by value. Structured values are passed as an [`IdentityToken`],
//! which compares by the identity of the shared allocation behind it: the
//! same token (or a clone of it) is equal to itself, while two tokens built
//! from equal but distinct values are not. A token created fresh on every
//! cycle therefore always counts as changed.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

/// Ordered list of dependencies for one effect run.
pub type Dependencies = SmallVec<[Dependency; 4]>;

/// One entry of a dependency list.
///
/// Entries of different variants are never equal, so `Int(1)` and
/// `Float(1.0)` count as a change. Floats use IEEE equality: `NaN` is never
/// equal to itself and always registers as changed.
#[derive(Debug, Clone, PartialEq)]
pub enum Dependency {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Token(IdentityToken),
}

/// A shared value that compares by identity rather than contents.
#[derive(Clone)]
pub struct IdentityToken(Arc<dyn Any + Send + Sync>);

impl IdentityToken {
    /// Wrap a value in a new token.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Token for an existing shared value. Tokens made from clones of the
    /// same `Arc` are equal.
    pub fn of<T: Any + Send + Sync>(shared: &Arc<T>) -> Self {
        Self(Arc::clone(shared) as Arc<dyn Any + Send + Sync>)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for IdentityToken {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityToken({:p})", self.addr())
    }
}

impl From<()> for Dependency {
    fn from(_: ()) -> Self {
        Dependency::None
    }
}

impl From<bool> for Dependency {
    fn from(value: bool) -> Self {
        Dependency::Bool(value)
    }
}

impl From<i32> for Dependency {
    fn from(value: i32) -> Self {
        Dependency::Int(i64::from(value))
    }
}

impl From<u32> for Dependency {
    fn from(value: u32) -> Self {
        Dependency::Int(i64::from(value))
    }
}

impl From<i64> for Dependency {
    fn from(value: i64) -> Self {
        Dependency::Int(value)
    }
}

impl From<f64> for Dependency {
    fn from(value: f64) -> Self {
        Dependency::Float(value)
    }
}

impl From<&str> for Dependency {
    fn from(value: &str) -> Self {
        Dependency::Str(Arc::from(value))
    }
}

impl From<String> for Dependency {
    fn from(value: String) -> Self {
        Dependency::Str(Arc::from(value))
    }
}

impl From<&String> for Dependency {
    fn from(value: &String) -> Self {
        Dependency::Str(Arc::from(value.as_str()))
    }
}

impl From<Arc<str>> for Dependency {
    fn from(value: Arc<str>) -> Self {
        Dependency::Str(value)
    }
}

impl From<IdentityToken> for Dependency {
    fn from(value: IdentityToken) -> Self {
        Dependency::Token(value)
    }
}

impl<T: Into<Dependency>> From<Option<T>> for Dependency {
    fn from(value: Option<T>) -> Self {
        value.map_or(Dependency::None, Into::into)
    }
}

/// Build a [`Dependencies`] list from values convertible into
/// [`Dependency`].
///
/// ```rust
/// use ripple_core::deps;
/// use ripple_core::effect::Dependency;
///
/// let deps = deps!["ann", 3, true];
/// assert_eq!(deps[1], Dependency::Int(3));
/// assert!(deps![].is_empty());
/// ```
#[macro_export]
macro_rules! deps {
    () => {
        $crate::effect::Dependencies::new()
    };
    ($($dep:expr),+ $(,)?) => {{
        let mut deps = $crate::effect::Dependencies::new();
        $(deps.push($crate::effect::Dependency::from($dep));)+
        deps
    }};
}

/// Decide whether an effect must run given its previous and current
/// dependency lists.
///
/// Absent current dependencies always run. A site that has never run always
/// runs. Otherwise the effect runs iff the lists differ in length or in any
/// position.
pub fn should_run(previous: Option<&[Dependency]>, current: Option<&[Dependency]>) -> bool {
    match (previous, current) {
        (_, None) | (None, _) => true,
        (Some(previous), Some(current)) => {
            previous.len() != current.len()
                || previous.iter().zip(current).any(|(old, new)| old != new)
        }
    }
}
