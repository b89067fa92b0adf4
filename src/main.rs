fn main() {
    if let Err(err) = session_tracker_lib::run() {
        eprintln!("session-tracker: {err:#}");
        std::process::exit(1);
    }
}
