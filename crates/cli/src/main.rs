use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    billable_observability::init();

    let cli = cli::Cli::parse();
    println!("{}", cli.run()?);
    Ok(())
}
