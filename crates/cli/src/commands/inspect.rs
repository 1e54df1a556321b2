use campusgate_auth::{CredentialCodec, fingerprint};
use campusgate_core::GateConfig;

pub fn run(config: &GateConfig, credential: &str) -> anyhow::Result<()> {
    let codec = CredentialCodec::from_config(config);
    println!("credential: {}", fingerprint(credential));

    if codec.is_synthetic(credential) {
        println!("synthetic credential ({:?} environment): never expires", config.environment);
        return Ok(());
    }

    match codec.decode_claims(credential) {
        Ok(claims) => {
            println!("claims:     {}", serde_json::to_string_pretty(&claims)?);
            match claims.expires_at() {
                Some(at) => println!("expires at: {}", at.to_rfc3339()),
                None => println!("expires at: (out of range)"),
            }
        }
        Err(err) => println!("undecodable: {err}"),
    }

    let verdict = if codec.is_expired(credential) { "expired" } else { "valid" };
    println!("verdict:    {verdict}");
    Ok(())
}
