use std::process::ExitCode;

fn main() -> ExitCode {
    attendance_kiosk::app::startup::startup()
}
