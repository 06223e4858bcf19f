#![expect(clippy::indexing_slicing)]

mod io;
mod nested;
