use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    metacollect::app::run_meta_collection(std::env::args().skip(1))
}
