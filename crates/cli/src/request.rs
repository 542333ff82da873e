use anyhow::{bail, Context};
use ferrous_lookup_domain::{LookupConfig, LookupRequest};
use std::net::IpAddr;

/// Builds the lookup from the positional arguments and the merged config.
///
/// `extra` holds what follows the server: nothing, a bootstrap IP, or a
/// DNSCrypt provider name and server public key.
pub fn build(
    domain: &str,
    server: &str,
    extra: &[String],
    lookup: &LookupConfig,
) -> anyhow::Result<LookupRequest> {
    let mut request = LookupRequest::new(domain, server)
        .with_class(lookup.parsed_class()?)
        .with_options(lookup.lookup_options());

    if let Some(record_type) = lookup.parsed_record_type()? {
        request = request.with_record_type(record_type);
    }

    match extra {
        [] => {}
        [bootstrap] => {
            let ip: IpAddr = bootstrap
                .parse()
                .with_context(|| format!("invalid bootstrap IP '{}'", bootstrap))?;
            request = request.with_bootstrap(ip);
        }
        [provider_name, server_pk] => {
            request = request.with_dnscrypt(provider_name, server_pk);
        }
        _ => bail!("too many arguments after the server"),
    }

    Ok(request)
}
