fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = fax_drv::run(args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
