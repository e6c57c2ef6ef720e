mod conversions;
mod hoisting;
mod includes;
mod inheritance;
mod operators;
mod overloads;
mod statements;
