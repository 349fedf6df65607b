// This file is part of rpki-rp.
// SPDX-License-Identifier: Apache-2.0

//! The ambient serving path: a Tokio TCP accept loop that streams the
//! current VRP snapshot to routers speaking the RTR protocol. One task per
//! connection.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use rpki_rp_repo::Vrp;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn, Instrument};

use crate::codec::{self, peek_total_length};
use crate::error::RtrError;
use crate::pdu::{ErrorPdu, Ipv4PrefixPdu, Ipv6PrefixPdu, RtrErrorCode, RtrPdu};

/// The data source a served connection reads from: a session identifier, a
/// monotonically increasing serial, and the VRP set valid as of that serial.
///
/// This is the seam between the validation walker's output and the RTR
/// wire protocol — nothing in this crate depends on how the snapshot is
/// produced or refreshed.
#[async_trait]
pub trait VrpFeed: Send + Sync {
    async fn current(&self) -> (u16, u32, Vec<Vrp>);
}

/// Runs the accept loop until the listener is closed or returns an error.
/// Each accepted connection is handled in its own task so a slow or stuck
/// router cannot block others.
pub async fn serve(listener: TcpListener, feed: Arc<dyn VrpFeed>) -> Result<(), RtrError> {
    loop {
        let (socket, peer) = listener.accept().await?;
        let feed = feed.clone();
        let span = tracing::info_span!("rtr_connection", %peer);
        tokio::spawn(
            async move {
                if let Err(err) = handle_connection(socket, feed).await {
                    warn!(error = %err, "rtr connection ended with an error");
                }
            }
            .instrument(span),
        );
    }
}

fn vrp_to_pdu(vrp: &Vrp, flags: u8) -> Option<RtrPdu> {
    match vrp.prefix.ip() {
        IpAddr::V4(addr) => Some(RtrPdu::Ipv4Prefix(Ipv4PrefixPdu {
            flags,
            prefix_length: vrp.prefix.prefix(),
            max_length: vrp.max_length,
            prefix: addr,
            asn: vrp.asn,
        })),
        IpAddr::V6(addr) => Some(RtrPdu::Ipv6Prefix(Ipv6PrefixPdu {
            flags,
            prefix_length: vrp.prefix.prefix(),
            max_length: vrp.max_length,
            prefix: addr,
            asn: vrp.asn,
        })),
    }
}

const ANNOUNCE: u8 = 1;

async fn write_pdu(socket: &mut TcpStream, pdu: &RtrPdu) -> Result<(), RtrError> {
    socket.write_all(&codec::encode(pdu)).await?;
    Ok(())
}

/// Reads exactly one PDU off `socket`: the 8-byte header first (to learn the
/// total length), then the remainder.
async fn read_pdu(socket: &mut TcpStream) -> Result<Vec<u8>, RtrError> {
    let mut header = [0u8; 8];
    socket.read_exact(&mut header).await?;
    let total_length = peek_total_length(&header) as usize;
    let mut buf = header.to_vec();
    if total_length > 8 {
        let mut rest = vec![0u8; total_length - 8];
        socket.read_exact(&mut rest).await?;
        buf.extend_from_slice(&rest);
    }
    Ok(buf)
}

async fn handle_connection(mut socket: TcpStream, feed: Arc<dyn VrpFeed>) -> Result<(), RtrError> {
    loop {
        let bytes = match read_pdu(&mut socket).await {
            Ok(bytes) => bytes,
            Err(RtrError::Io(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!("peer closed the connection");
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let pdu = match codec::decode(&bytes) {
            Ok(pdu) => pdu,
            Err(bad) => {
                let error = RtrPdu::Error(ErrorPdu {
                    error_code: bad.error_code,
                    causing_pdu: bad.raw_bytes,
                    error_text: format!("{:?}", bad.error_code),
                });
                write_pdu(&mut socket, &error).await?;
                if bad.error_code.is_fatal() {
                    return Ok(());
                }
                continue;
            }
        };

        match pdu {
            RtrPdu::ResetQuery => {
                let (session_id, serial, vrps) = feed.current().await;
                write_pdu(&mut socket, &RtrPdu::CacheResponse { nonce: session_id }).await?;
                for vrp in &vrps {
                    if let Some(pdu) = vrp_to_pdu(vrp, ANNOUNCE) {
                        write_pdu(&mut socket, &pdu).await?;
                    }
                }
                write_pdu(
                    &mut socket,
                    &RtrPdu::EndOfData {
                        nonce: session_id,
                        serial,
                    },
                )
                .await?;
                info!(vrp_count = vrps.len(), "served full snapshot");
            }
            other => {
                let error = RtrPdu::Error(ErrorPdu {
                    error_code: RtrErrorCode::InvalidRequest,
                    causing_pdu: bytes,
                    error_text: format!("unexpected PDU from router: {other:?}"),
                });
                write_pdu(&mut socket, &error).await?;
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipnetwork::IpNetwork;
    use std::net::Ipv4Addr;
    use std::str::FromStr;
    use tokio::net::TcpListener;

    struct FixedFeed {
        session_id: u16,
        serial: u32,
        vrps: Vec<Vrp>,
    }

    #[async_trait]
    impl VrpFeed for FixedFeed {
        async fn current(&self) -> (u16, u32, Vec<Vrp>) {
            (self.session_id, self.serial, self.vrps.clone())
        }
    }

    #[tokio::test]
    async fn reset_query_yields_cache_response_prefixes_and_end_of_data() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let feed = Arc::new(FixedFeed {
            session_id: 7,
            serial: 3,
            vrps: vec![Vrp {
                prefix: IpNetwork::from_str("192.0.2.0/24").unwrap(),
                max_length: 24,
                asn: 65001,
            }],
        });

        tokio::spawn(serve(listener, feed));

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(&codec::encode(&RtrPdu::ResetQuery)).await.unwrap();

        let cache_response = read_pdu(&mut client).await.unwrap();
        assert_eq!(
            codec::decode(&cache_response).unwrap(),
            RtrPdu::CacheResponse { nonce: 7 }
        );

        let prefix = read_pdu(&mut client).await.unwrap();
        match codec::decode(&prefix).unwrap() {
            RtrPdu::Ipv4Prefix(p) => {
                assert!(p.is_announcement());
                assert_eq!(p.asn, 65001);
                assert_eq!(p.prefix, Ipv4Addr::new(192, 0, 2, 0));
            }
            other => panic!("expected Ipv4Prefix, got {other:?}"),
        }

        let end = read_pdu(&mut client).await.unwrap();
        assert_eq!(
            codec::decode(&end).unwrap(),
            RtrPdu::EndOfData { nonce: 7, serial: 3 }
        );
    }

    #[tokio::test]
    async fn malformed_pdu_yields_error_and_closes_on_fatal_code() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let feed = Arc::new(FixedFeed {
            session_id: 1,
            serial: 1,
            vrps: vec![],
        });

        tokio::spawn(serve(listener, feed));

        let mut client = TcpStream::connect(addr).await.unwrap();
        // Bogus protocol version byte -> UnsupportedProtocolVersion (fatal).
        client
            .write_all(&[0x01, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x08])
            .await
            .unwrap();

        let response = read_pdu(&mut client).await.unwrap();
        match codec::decode(&response).unwrap() {
            RtrPdu::Error(err) => {
                assert_eq!(err.error_code, RtrErrorCode::UnsupportedProtocolVersion);
            }
            other => panic!("expected Error, got {other:?}"),
        }

        let mut buf = [0u8; 1];
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(n, 0, "server should have closed the connection");
    }
}
