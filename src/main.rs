fn main() {
    if let Err(err) = labelwarp::run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
