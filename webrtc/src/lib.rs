//! A minimal peer connection binding `sdp` session descriptions to the
//! `ice` agent's gather/connectivity-check lifecycle.
//!
//! This crate is not itself part of the ICE/STUN/TURN surface; it only
//! needs to honor its contracts with that core (an offer/answer
//! exchange drives `ice::Agent` the way a real RTCPeerConnection would).
//! The hardcoded VP8/RTX media line is a stand-in for an RTP stack this
//! workspace doesn't implement.

use std::time::{Duration, Instant};

use log::warn;

const GATHER_POLL_INTERVAL: Duration = Duration::from_millis(20);
const GATHER_TIMEOUT: Duration = Duration::from_secs(5);

pub trait State {}

pub struct New;
impl State for New {}

pub struct HasRemoteDescription<'a> {
    remote_description: sdp::SessionDescription<'a>,
}
impl State for HasRemoteDescription<'_> {}

pub struct HasLocalAndRemoteDescriptions<'a> {
    local_description: sdp::SessionDescription<'static>,
    _remote_description: sdp::SessionDescription<'a>,
}
impl State for HasLocalAndRemoteDescriptions<'_> {}

pub struct PeerConnection<S: State> {
    ice_agent: ice::Agent,
    stream_id: u32,
    state: S,
}

impl PeerConnection<New> {
    pub fn new() -> Self {
        let mut ice_agent = ice::Agent::new(ice::AgentConfig::default());
        let stream_id = ice_agent.add_stream(1);
        Self { ice_agent, stream_id, state: New }
    }

    pub fn set_remote_description<'a>(
        mut self,
        remote_description: sdp::SessionDescription<'a>,
    ) -> PeerConnection<HasRemoteDescription<'a>> {
        if let Some((ufrag, pwd)) = remote_ice_credentials(&remote_description) {
            if let Err(err) = self.ice_agent.set_remote_credentials(self.stream_id, &ufrag, &pwd) {
                warn!("failed to set remote ice credentials: {}", err);
            }
        }

        let candidates = remote_candidates(&remote_description, self.stream_id);
        if !candidates.is_empty() {
            if let Err(err) = self.ice_agent.set_remote_candidates(self.stream_id, 1, candidates) {
                warn!("failed to set remote candidates: {}", err);
            }
        }

        PeerConnection {
            ice_agent: self.ice_agent,
            stream_id: self.stream_id,
            state: HasRemoteDescription { remote_description },
        }
    }
}

impl Default for PeerConnection<New> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> PeerConnection<HasRemoteDescription<'a>> {
    pub fn create_answer(&self) -> sdp::SessionDescription<'static> {
        let (ice_ufrag, ice_pwd) = self
            .ice_agent
            .local_credentials(self.stream_id)
            .map(|(u, p)| (u.to_owned(), p.to_owned()))
            .unwrap_or_default();

        base_session_description(video_media_description(&ice_ufrag, &ice_pwd, vec![]))
    }

    /// Starts gathering and blocks (polling [`ice::Agent::tick`] on the
    /// calling thread) until it completes or [`GATHER_TIMEOUT`] elapses,
    /// then folds the gathered candidates into `local_description`'s
    /// first media section.
    pub fn set_local_description(
        mut self,
        mut local_description: sdp::SessionDescription<'static>,
    ) -> Result<PeerConnection<HasLocalAndRemoteDescriptions<'a>>, ice::Error> {
        self.ice_agent.gather_candidates(self.stream_id)?;

        let deadline = Instant::now() + GATHER_TIMEOUT;
        while !self.ice_agent.gathering_done(self.stream_id) && Instant::now() < deadline {
            self.ice_agent.tick(Instant::now())?;
            std::thread::sleep(GATHER_POLL_INTERVAL);
        }

        if let Some(media) = local_description.media_descriptions.first_mut() {
            for candidate in self.ice_agent.local_candidates(self.stream_id, 1) {
                media.attributes.push(candidate_attribute(&candidate));
            }
        }

        let state = HasLocalAndRemoteDescriptions {
            local_description,
            _remote_description: self.state.remote_description,
        };

        Ok(PeerConnection { ice_agent: self.ice_agent, stream_id: self.stream_id, state })
    }
}

impl<'a> PeerConnection<HasLocalAndRemoteDescriptions<'a>> {
    pub fn local_description(&self) -> &sdp::SessionDescription<'static> {
        &self.state.local_description
    }
}

/// The shared VP8/RTX media line both [`PeerConnection::create_answer`]
/// and the standalone answerer in `main.rs` build their SDP around.
pub fn video_media_description(
    ice_ufrag: &str,
    ice_pwd: &str,
    extra_attributes: Vec<sdp::Attribute>,
) -> sdp::MediaDescription {
    let mut attributes = vec![
        sdp::Attribute::value("rtpmap", "96 VP8/90000"),
        sdp::Attribute::value("rtpmap", "97 rtx/90000"),
        sdp::Attribute::value("fmtp", "97 apt=96"),
        sdp::Attribute::value("ftcp-fb", "96 goog-remb"),
        sdp::Attribute::value("ftcp-fb", "96 ccm fir"),
        sdp::Attribute::value("ftcp-fb", "96 nack"),
        sdp::Attribute::value("ftcp-fb", "96 nack pli"),
        sdp::Attribute::value("extmap", "2 urn:ietf:params:rtp-hdrext:toffset"),
        sdp::Attribute::value(
            "extmap",
            "3 http://www.webrtc.org/experiments/rtp-hdrext/abs-send-time",
        ),
        sdp::Attribute::value("extmap", "4 urn:3gpp:video-orientation"),
        sdp::Attribute::value("setup", "active"),
        sdp::Attribute::value("mid", "0"),
        sdp::Attribute::property("sendonly"),
        sdp::Attribute::value("ice-ufrag", ice_ufrag),
        sdp::Attribute::value("ice-pwd", ice_pwd),
        sdp::Attribute::value("ice-options", "renomination"),
        sdp::Attribute::property("rtcp-mux"),
        sdp::Attribute::property("rtcp-rsize"),
    ];
    attributes.extend(extra_attributes);

    sdp::MediaDescription::base(sdp::Media {
        typ: sdp::MediaType::Video,
        port: 7,
        protocol: "RTP/SAVPF".to_owned(),
        format: "96 97".to_owned(),
    })
    .with_connection(sdp::Connection {
        network_type: "IN".to_owned(),
        address_type: "IP4".to_owned(),
        connection_address: "127.0.0.1".to_owned(),
    })
    .with_attributes(attributes)
}

pub fn base_session_description(video_description: sdp::MediaDescription) -> sdp::SessionDescription<'static> {
    sdp::SessionDescription::base(
        sdp::Version(0),
        sdp::Origin {
            username: "rtcrs".to_owned(),
            session_id: 1_433_832_402_044_130_222,
            session_version: 1,
            network_type: "IN".to_owned(),
            address_type: "IP4".to_owned(),
            unicast_address: "127.0.0.1".to_owned(),
        },
        sdp::SessionName::new("-"),
        sdp::TimeDescription::base(sdp::Timing { start_time: 0, stop_time: 0 }),
    )
    .with_attributes(vec![
        sdp::Attribute::property("ice-lite"),
        sdp::Attribute::value(
            "fingerprint",
            "sha-512 4E:DD:25:41:95:51:85:B6:6A:29:42:FF:56:5B:41:47:2C:6C:67:36:7D:97:91:5A:65:C7:E1:76:1B:6E:D3:22:45:B4:9F:DF:EA:93:FF:20:F4:CB:A8:53:AF:50:DA:87:5A:C5:4C:5B:F6:4C:50:DC:D9:29:A3:C0:19:7A:17:48",
        ),
        sdp::Attribute::value("msid-semantic", " WMS *"),
        sdp::Attribute::value("group", "BUNDLE 0"),
    ])
    .and_media_description(video_description)
}

pub fn candidate_attribute(candidate: &ice::Candidate) -> sdp::Attribute {
    let typ = match candidate.kind {
        ice::Kind::Host => "host",
        ice::Kind::ServerReflexive => "srflx",
        ice::Kind::PeerReflexive => "prflx",
        ice::Kind::Relayed => "relay",
    };
    let value = format!(
        "{} {} udp {} {} {} typ {}",
        candidate.foundation,
        candidate.component_id,
        candidate.priority,
        candidate.address.ip(),
        candidate.address.port(),
        typ,
    );
    sdp::Attribute::value("candidate", &value)
}

fn attribute_value<'a>(attributes: &'a [sdp::Attribute], name: &str) -> Option<&'a str> {
    attributes.iter().find_map(|attribute| match attribute {
        sdp::Attribute::Value(k, v) if k == name => Some(v.as_str()),
        _ => None,
    })
}

fn remote_ice_credentials(description: &sdp::SessionDescription) -> Option<(String, String)> {
    let session_or_media = |name: &str| {
        attribute_value(&description.attributes, name)
            .or_else(|| description.media_descriptions.iter().find_map(|m| attribute_value(&m.attributes, name)))
    };
    let ufrag = session_or_media("ice-ufrag")?;
    let pwd = session_or_media("ice-pwd")?;
    Some((ufrag.to_owned(), pwd.to_owned()))
}

fn remote_candidates(description: &sdp::SessionDescription, stream_id: u32) -> Vec<ice::Candidate> {
    let (ufrag, pwd) = remote_ice_credentials(description).unwrap_or_default();
    description
        .media_descriptions
        .iter()
        .flat_map(|media| media.attributes.iter())
        .filter_map(|attribute| match attribute {
            sdp::Attribute::Value(k, v) if k == "candidate" => parse_candidate(v, stream_id, &ufrag, &pwd),
            _ => None,
        })
        .collect()
}

/// Parses one `a=candidate` value per RFC 5245 §15.1, e.g.
/// `"1 1 udp 2130706431 192.168.1.10 54321 typ host"`.
fn parse_candidate(value: &str, stream_id: u32, ufrag: &str, pwd: &str) -> Option<ice::Candidate> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    if tokens.len() < 8 || !tokens[2].eq_ignore_ascii_case("udp") {
        return None;
    }
    let foundation = tokens[0].to_owned();
    let component_id: u16 = tokens[1].parse().ok()?;
    let priority: u32 = tokens[3].parse().ok()?;
    let address = address::Address::set_from_string(&format!("{}:{}", tokens[4], tokens[5])).ok()?;
    let typ_index = tokens.iter().position(|t| *t == "typ")?;
    let kind = match *tokens.get(typ_index + 1)? {
        "host" => ice::Kind::Host,
        "srflx" => ice::Kind::ServerReflexive,
        "prflx" => ice::Kind::PeerReflexive,
        "relay" => ice::Kind::Relayed,
        _ => return None,
    };

    Some(ice::Candidate {
        kind,
        transport: ice::Transport::Udp,
        base_address: address,
        address,
        priority,
        foundation,
        component_id,
        stream_id,
        ufrag: ufrag.to_owned(),
        pwd: pwd.to_owned(),
        relay_server: None,
        socket: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_host_candidate_line() {
        let candidate = parse_candidate(
            "1 1 udp 2130706431 192.168.1.10 54321 typ host",
            7,
            "ufrag",
            "pwd",
        )
        .unwrap();
        assert_eq!(candidate.kind, ice::Kind::Host);
        assert_eq!(candidate.component_id, 1);
        assert_eq!(candidate.stream_id, 7);
        assert_eq!(candidate.priority, 2_130_706_431);
    }

    #[test]
    fn rejects_non_udp_candidate_lines() {
        assert!(parse_candidate("1 1 tcp 2105524479 192.168.1.10 54321 typ host", 1, "u", "p").is_none());
    }
}
