pub const LABSIM_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version_cli_text() -> String {
    format!(
        "labsim {}\nProtocol {}\nProtocol performance evaluator for lab skills training",
        LABSIM_VERSION,
        labsim_protocol::PROTOCOL_VERSION
    )
}
