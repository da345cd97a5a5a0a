use era5vis::{cli, Config};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::from_env();
    std::process::exit(cli::modellevel(args, &config));
}
