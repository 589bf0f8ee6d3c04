fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match appsweep_core::runtime::parse_cli_args(&args) {
        Ok(command) => command,
        Err(error) => {
            eprintln!("[appsweep-core] {error}");
            std::process::exit(2);
        }
    };

    if let Err(error) = appsweep_core::runtime::run(command) {
        eprintln!("[appsweep-core] {error}");
        std::process::exit(1);
    }
}
