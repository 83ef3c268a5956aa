//! ofxwise - Convert Wise/TransferWise CSV exports to OFX.

fn main() -> std::process::ExitCode {
    ofxwise::cmd::convert_cmd::main()
}
