use std::fmt;

use smallvec::SmallVec;

use crate::foundation::error::{StewieError, StewieResult};

/// One slot of a [`Transform`].
///
/// The slot kind is fixed when the vector is built; the sink never has to guess.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Component {
    /// Numeric value, rounded to two decimals on output.
    Num(f64),
    /// Literal placeholder, written verbatim.
    Label(String),
}

impl Component {
    /// Numeric value, if this slot is numeric.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Self::Num(v) => Some(*v),
            Self::Label(_) => None,
        }
    }
}

impl From<f64> for Component {
    fn from(v: f64) -> Self {
        Self::Num(v)
    }
}

impl From<&str> for Component {
    fn from(s: &str) -> Self {
        Self::Label(s.to_owned())
    }
}

impl From<String> for Component {
    fn from(s: String) -> Self {
        Self::Label(s)
    }
}

/// Ordered transform vector handed to a sink once per tick.
///
/// Arity is a contract between a program and its motions: 4 for axis-angle, 6 for
/// euclidean rotation + translation, 7 for axis-angle + translation.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Transform(SmallVec<[Component; 7]>);

impl Transform {
    /// Build a purely numeric transform.
    pub fn from_nums(values: &[f64]) -> Self {
        values.iter().copied().map(Component::Num).collect()
    }

    /// All-zero transform of the given arity.
    pub fn zeros(arity: usize) -> Self {
        std::iter::repeat_n(Component::Num(0.0), arity).collect()
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn components(&self) -> &[Component] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Component> {
        self.0.iter()
    }

    /// Numeric values, or `None` if any slot is a label.
    pub fn nums(&self) -> Option<Vec<f64>> {
        self.0.iter().map(Component::as_num).collect()
    }

    /// Fail with [`StewieError::Arity`] unless `other` has the same arity.
    pub fn ensure_same_arity(&self, other: &Transform) -> StewieResult<()> {
        if self.arity() != other.arity() {
            return Err(StewieError::Arity {
                expected: self.arity(),
                found: other.arity(),
            });
        }
        Ok(())
    }

    /// Re-base `self` onto the shape of `target`.
    ///
    /// Slots `self` lacks are taken from `target`; extra slots are dropped.
    pub fn conform_to(&self, target: &Transform) -> Transform {
        if self.arity() == target.arity() {
            return self.clone();
        }
        target
            .iter()
            .enumerate()
            .map(|(i, t)| self.0.get(i).unwrap_or(t).clone())
            .collect()
    }
}

impl FromIterator<Component> for Transform {
    fn from_iter<I: IntoIterator<Item = Component>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[f64; N]> for Transform {
    fn from(values: [f64; N]) -> Self {
        Self::from_nums(&values)
    }
}

impl From<Vec<Component>> for Transform {
    fn from(values: Vec<Component>) -> Self {
        Self(SmallVec::from_vec(values))
    }
}

impl std::ops::Index<usize> for Transform {
    type Output = Component;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a Transform {
    type Item = &'a Component;
    type IntoIter = std::slice::Iter<'a, Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::sink::format_line(self))
    }
}
