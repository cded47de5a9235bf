pub mod analyzer;
pub mod executor;
pub mod organizer;
pub mod renamer;
pub mod scanner;
pub mod tagger;
pub mod warnings;

#[cfg(test)]
pub mod testutil;
