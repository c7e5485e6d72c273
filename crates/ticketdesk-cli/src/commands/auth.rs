use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

use super::App;

pub async fn login(app: &App, email: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password)?;
    tracing::debug!(%email, "Logging in");
    app.auth
        .login(email, &password)
        .await
        .context("Login failed")?;
    println!("✅ Logged in as {}", email);
    Ok(())
}

pub async fn register(app: &App, email: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password)?;
    app.auth
        .register(email, &password)
        .await
        .context("Registration failed")?;
    println!("✅ Account created for {}", email);
    println!("Run `ticketdesk login --email {}` to start a session.", email);
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    if !app.auth.is_authenticated() {
        tracing::debug!("Logout requested without a stored session");
        println!("Not logged in.");
        return Ok(());
    }
    app.auth.logout().await.context("Logout failed")?;
    println!("✅ Logged out");
    Ok(())
}

fn resolve_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    print!("Password: ");
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }
    Ok(password)
}
