use smallsh::config::Config;
use smallsh::flags::Flags;
use smallsh::shell::Shell;
use std::env;
use std::process;

fn main() {
    let mut flags = Flags::new();
    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = flags.parse(&args) {
        eprintln!("smallsh: {}", e);
        process::exit(1);
    }

    if flags.is_set("help") {
        flags.print_help();
        return;
    }

    if flags.is_set("version") {
        println!("smallsh {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let config = Config::from_flags(&flags);
    smallsh::logging::init(&config);

    let result = Shell::new(config).and_then(|mut shell| shell.run());
    if let Err(e) = result {
        eprintln!("smallsh: {}", e);
        process::exit(1);
    }
}
