mod error;
mod files;
