pub mod filename;

pub use filename::format_file_name;
