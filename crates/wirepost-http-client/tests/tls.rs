use bytes::Bytes;
use http_body_util::Full;
use hyper::{body::Incoming, server::conn::http1, service::service_fn, Request, Response};
use hyper_util::rt::TokioIo;
use rustls::pki_types::{CertificateDer, PrivatePkcs8KeyDer};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use wirepost_http_client::Client;

/// Serve "ack" over HTTPS with a freshly generated self-signed certificate,
/// returning the bound port
async fn spawn_self_signed_server() -> u16 {
    let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let cert_der = CertificateDer::from(cert.cert);
    let key_der = PrivatePkcs8KeyDer::from(cert.key_pair.serialize_der());

    let server_config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(vec![cert_der], key_der.into())
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(server_config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };

            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                // A client refusing the certificate just drops the connection
                let Ok(stream) = acceptor.accept(stream).await else {
                    return;
                };

                let service = service_fn(|_req: Request<Incoming>| async {
                    Ok::<_, std::convert::Infallible>(Response::new(Full::new(Bytes::from(
                        "ack",
                    ))))
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    port
}

#[tokio::test]
async fn trust_all_client_accepts_a_self_signed_certificate() {
    let port = spawn_self_signed_server().await;

    let client = Client::builder()
        .danger_accept_invalid_certs(true)
        .build()
        .unwrap();

    let response = client
        .post(format!("https://localhost:{port}/ingest"), "ping")
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "ack");
}

#[tokio::test]
async fn validating_client_rejects_a_self_signed_certificate() {
    let port = spawn_self_signed_server().await;

    // Hosts without a native root store can't build a validating client in
    // the first place, which is a rejection of its own
    let Ok(client) = Client::builder().build() else {
        return;
    };

    client
        .post(format!("https://localhost:{port}/ingest"), "ping")
        .await
        .unwrap_err();
}

#[tokio::test]
async fn plain_client_rejects_https_without_a_handshake() {
    // A plain client has no TLS machinery at all; the connector refuses the
    // scheme before anything touches the network.
    let client = Client::builder().build_plain();

    client
        .post("https://localhost:1/ingest", "x")
        .await
        .unwrap_err();
}
