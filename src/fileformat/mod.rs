pub mod cell_list_file;
pub mod discover;
pub mod telomere_output;

pub use cell_list_file::parse_cell_list;
pub use cell_list_file::read_cell_list_file;

pub use discover::find_alignment_files;
pub use discover::find_allow_list_files;

pub use telomere_output::check_distinct_outputs;
pub use telomere_output::histogram_paths;
pub use telomere_output::sample_name;
pub use telomere_output::write_histogram;
pub use telomere_output::OutputLayout;
pub use telomere_output::OutputNaming;
pub use telomere_output::OutputPaths;
