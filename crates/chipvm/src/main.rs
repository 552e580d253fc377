use chipvm::RunOptions;

fn main() {
    env_logger::init();

    let options = match RunOptions::from_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{:#}", err);
            eprintln!(
                "Usage: chipvm <rom> [--frames N] [--ips N] [--shift-vy] [--jump-vx] \
                 [--index-inc] [--seed N] [--disasm]"
            );
            std::process::exit(2);
        }
    };

    log::info!("Playing ROM path: '{}'", options.rom_path.display());
    if let Err(err) = chipvm::run(&options) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
