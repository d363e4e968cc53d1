use std::error::Error as _;
use structopt::StructOpt;

fn main() {
    mvcli_lib::MvCli::from_args()
        .exec()
        .unwrap_or_else(report_error)
}

fn report_error(error: mvcli_lib::Error) {
    eprintln!("{}", error);
    let mut source = error.source();
    while let Some(sub_error) = source {
        eprintln!("  |-> {}", sub_error);
        source = sub_error.source();
    }
    std::process::exit(1)
}
