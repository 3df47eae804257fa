use std::process::ExitCode;

fn main() -> ExitCode {
    minicc_drv::main()
}
