// # Mazewalk
//
// Randomized depth-first maze traversal with backtracking. Given an
// undirected graph of rooms (up to four directional exits each), a single
// pass produces a move sequence that visits every room; repeated trials
// minimize the sequence length, optionally fanned out across worker
// threads that each report their best result.

/// Serialized map format (JSON room records).
pub mod map;

/// Immutable room topology plus loading, validation and ASCII rendering.
pub mod world;

/// Position tracking over a world.
pub mod player;

/// The randomized DFS traversal engine and path verification.
pub mod traverse;

/// Repeated-trial minimization, serial and parallel.
pub mod trials;

/// Tools for generating test mazes.
pub mod mapgen {
    /// A module for generating random grid mazes.
    pub mod random;
}

/// A trait for conveniently updating a value to its minimum or maximum.
pub trait SetMinMax {
    /// If `v` is less than `self`, updates `self` to `v` and returns `true`.
    /// Otherwise, returns `false`.
    fn setmin(&mut self, v: Self) -> bool;
    /// If `v` is greater than `self`, updates `self` to `v` and returns `true`.
    /// Otherwise, returns `false`.
    fn setmax(&mut self, v: Self) -> bool;
}
impl<T> SetMinMax for T
where
    T: PartialOrd,
{
    fn setmin(&mut self, v: T) -> bool {
        *self > v && {
            *self = v;
            true
        }
    }
    fn setmax(&mut self, v: T) -> bool {
        *self < v && {
            *self = v;
            true
        }
    }
}

/// A macro for convenient initialization of vectors, including nested vectors for multi-dimensional arrays.
///
/// # Examples
///
/// ```
/// use mazewalk::mat;
/// // A simple vector
/// let v1 = mat![1, 2, 3];
///
/// // A 2x3 matrix initialized with zeros
/// let m1 = mat![0; 2; 3];
/// assert_eq!(m1, vec![vec![0, 0, 0], vec![0, 0, 0]]);
/// ```
#[macro_export]
macro_rules! mat {
    ($($e:expr),*) => { vec![$($e),*] };
    ($($e:expr,)*) => { vec![$($e),*] };
    ($e:expr; $d:expr) => { vec![$e; $d] };
    ($e:expr; $d:expr $(; $ds:expr)+) => { vec![mat![$e $(; $ds)*]; $d] };
}
