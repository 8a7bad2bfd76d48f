mod common;

mod applications;
mod comparisons;
mod favorites;
