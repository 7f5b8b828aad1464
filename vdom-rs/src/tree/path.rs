//! Positional addresses.

use std::fmt;

/// The child indices needed to reach a node from the fragment container.
///
/// The container itself has the empty path; root trees have a single-element
/// path. Paths are positional, not content-addressed: a node's path says
/// where it sits, never what it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(Vec<usize>);

impl Path {
    /// The empty path addressing the fragment container.
    pub fn root() -> Self {
        Path(Vec::new())
    }

    /// Returns a new path with `index` appended; `self` is left untouched.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = Vec::with_capacity(self.0.len() + 1);
        indices.extend_from_slice(&self.0);
        indices.push(index);
        Path(indices)
    }

    /// Returns the path of the parent, or `None` for the container.
    pub fn parent(&self) -> Option<Self> {
        self.0
            .split_last()
            .map(|(_, parent)| Path(parent.to_vec()))
    }

    /// Returns the index within the parent, or `None` for the container.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Returns the indices as a slice.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Returns the depth below the container.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the container path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Path(indices)
    }
}

impl From<&[usize]> for Path {
    fn from(indices: &[usize]) -> Self {
        Path(indices.to_vec())
    }
}

impl<const N: usize> PartialEq<[usize; N]> for Path {
    fn eq(&self, other: &[usize; N]) -> bool {
        self.0 == other
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", index)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_is_pure() {
        let path = Path::from(vec![1, 2, 3]);
        let child = path.child(4);
        assert_eq!(child, [1, 2, 3, 4]);
        assert_eq!(path, [1, 2, 3]);

        let sibling = path.child(5);
        assert_eq!(child, [1, 2, 3, 4]);
        assert_eq!(sibling, [1, 2, 3, 5]);
    }

    #[test]
    fn test_parent_and_last() {
        let path = Path::from(vec![0, 1]);
        assert_eq!(path.parent(), Some(Path::from(vec![0])));
        assert_eq!(path.last(), Some(1));
        assert_eq!(Path::root().parent(), None);
        assert!(Path::root().child(0).parent().unwrap().is_root());
    }

    #[test]
    fn test_display() {
        assert_eq!(Path::root().to_string(), "[]");
        assert_eq!(Path::from(vec![0, 1, 0]).to_string(), "[0 1 0]");
    }
}
