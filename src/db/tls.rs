//! TLS for PostgreSQL connections.
//!
//! Pooled connections go through tokio-postgres with a rustls connector
//! chosen by [`SslMode`]. Migrations use libpq, which reads `sslmode` from
//! the connection URL instead.

use std::sync::Arc;

use diesel::{ConnectionError, ConnectionResult};
use diesel_async::AsyncPgConnection;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tokio_postgres::NoTls;
use tokio_postgres_rustls::MakeRustlsConnect;

use crate::config::{DatabaseConfig, SslMode};

/// Builds the rustls connector for `mode`; `None` means plain TCP.
///
/// # Errors
///
/// Fails only if the ring provider rejects the default protocol versions.
pub fn tls_connector(mode: SslMode) -> Result<Option<MakeRustlsConnect>, rustls::Error> {
    if !mode.is_enabled() {
        return Ok(None);
    }

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()?;

    let config = match mode {
        SslMode::VerifyFull => {
            let roots = RootCertStore {
                roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
            };
            builder.with_root_certificates(roots).with_no_client_auth()
        }
        _ => builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AnyServerCertificate { provider }))
            .with_no_client_auth(),
    };

    Ok(Some(MakeRustlsConnect::new(config)))
}

/// Opens one pooled connection, over TLS when `tls` is set.
///
/// With a connector the handshake is mandatory; a server that refuses TLS
/// fails the connection rather than falling back to plain text.
pub async fn establish_connection(
    url: &str,
    tls: Option<MakeRustlsConnect>,
) -> ConnectionResult<AsyncPgConnection> {
    let mut config: tokio_postgres::Config = url.parse().map_err(bad_connection)?;

    match tls {
        Some(tls) => {
            config.ssl_mode(tokio_postgres::config::SslMode::Require);
            let (client, connection) = config.connect(tls).await.map_err(bad_connection)?;
            AsyncPgConnection::try_from_client_and_connection(client, connection).await
        }
        None => {
            let (client, connection) = config.connect(NoTls).await.map_err(bad_connection)?;
            AsyncPgConnection::try_from_client_and_connection(client, connection).await
        }
    }
}

/// The connection URL handed to libpq for migrations.
///
/// An explicit `sslmode` in the URL wins. Otherwise any enabled mode becomes
/// `sslmode=require`: libpq verifies certificates only against a local root
/// file, which deployments do not ship.
pub fn libpq_url(config: &DatabaseConfig) -> String {
    if !config.ssl_mode.is_enabled() || config.url.contains("sslmode=") {
        return config.url.clone();
    }

    let separator = if config.url.contains('?') { '&' } else { '?' };
    format!("{}{}sslmode=require", config.url, separator)
}

fn bad_connection(error: tokio_postgres::Error) -> ConnectionError {
    ConnectionError::BadConnection(error.to_string())
}

/// Accepts whatever certificate the server presents while still checking
/// handshake signatures, like libpq's `sslmode=require`.
#[derive(Debug)]
struct AnyServerCertificate {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AnyServerCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
