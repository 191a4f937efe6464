fn main() {
    if let Err(e) = fleet_reminders_lib::run(std::env::args().skip(1)) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
