//! `nkjwt verify` - Check a token's signature against its issuer.

use nkjwt::ClaimSet;

/// Verify a token's signature. Exits with status 1 when it does not verify.
pub fn verify(token: &str) -> anyhow::Result<()> {
    let token = super::read_value(token)?;

    if nkjwt::verify(&token) {
        println!("✔ Signature is valid");
        if let Ok(claims) = nkjwt::decode(&token) {
            println!();
            println!("Token Details:");
            println!("  Type:    {}", claims.kind());
            println!("  Subject: {}", claims.subject());
            println!("  Issuer:  {}", claims.issuer());
        }
    } else {
        println!("✖ Signature verification failed");
        std::process::exit(1);
    }

    Ok(())
}
