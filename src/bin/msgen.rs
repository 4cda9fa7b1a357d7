fn main() -> anyhow::Result<()> {
    msgen::cli::run_cli()
}
