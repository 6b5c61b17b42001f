pub mod csv_reader;
pub mod fetch_page;
pub mod generate_random_delay;
pub mod write_results;
