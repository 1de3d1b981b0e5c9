//! DNS record lookups for the on-demand analysis report.

use anyhow::Result;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::{system_conf, TokioResolver};
use tracing::{trace, warn};

/// Records gathered for one domain. Each record type fails independently to
/// an empty list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DnsRecords {
    pub a: Vec<String>,
    pub aaaa: Vec<String>,
    pub mx: Vec<String>,
    pub ns: Vec<String>,
    pub txt: Vec<String>,
}

/// Resolver wrapper for report-oriented record lookups.
pub struct RecordLookup {
    resolver: TokioResolver,
}

impl RecordLookup {
    /// Builds a resolver from the system configuration, falling back to
    /// Cloudflare when none is available.
    pub fn from_system() -> Result<Self> {
        let config = match system_conf::read_system_conf() {
            Ok((config, _)) if !config.name_servers().is_empty() => config,
            _ => {
                warn!("no system DNS servers found, falling back to Cloudflare DNS");
                ResolverConfig::cloudflare()
            }
        };

        let resolver = hickory_resolver::Resolver::builder_with_config(
            config,
            TokioConnectionProvider::default(),
        )
        .build();

        Ok(Self { resolver })
    }

    /// Looks up A, AAAA, MX, NS, and TXT records concurrently.
    pub async fn lookup(&self, domain: &str) -> DnsRecords {
        trace!(domain, "looking up DNS records");
        let (a, aaaa, mx, ns, txt) = tokio::join!(
            self.records(domain, RecordType::A),
            self.records(domain, RecordType::AAAA),
            self.records(domain, RecordType::MX),
            self.records(domain, RecordType::NS),
            self.records(domain, RecordType::TXT),
        );
        DnsRecords { a, aaaa, mx, ns, txt }
    }

    async fn records(&self, domain: &str, record_type: RecordType) -> Vec<String> {
        match self.resolver.lookup(domain, record_type).await {
            Ok(lookup) => lookup.iter().map(|r| r.to_string()).collect(),
            Err(e) => {
                trace!(domain, %record_type, error = %e, "record lookup empty");
                Vec::new()
            }
        }
    }
}
