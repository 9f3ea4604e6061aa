use anyhow::Result;

use super::Session;
use crate::config::Credential;

pub fn run(session: &Session) -> Result<()> {
    let client = session.client(Credential::Default)?;
    let resp = session.call("Fetching version", || client.version())?;
    session.write(&resp)
}
