use std::time::{Duration, Instant};

use anyhow::Result;

const GATHER_POLL_INTERVAL: Duration = Duration::from_millis(20);
const GATHER_TIMEOUT: Duration = Duration::from_secs(5);

/// Stands up an agent, gathers candidates against no remote peer, and
/// prints a base64-encoded answer SDP blob the way a signaling server
/// round-trip would hand back to a caller. There's no offer to answer
/// here, so this only exercises gathering, not connectivity checks.
fn main() -> Result<()> {
    env_logger::init();

    let mut ice_agent = ice::Agent::new(ice::AgentConfig::default());
    let stream_id = ice_agent.add_stream(1);

    let (ice_ufrag, ice_pwd) = ice_agent
        .local_credentials(stream_id)
        .map(|(u, p)| (u.to_owned(), p.to_owned()))
        .expect("stream was just created");

    ice_agent.gather_candidates(stream_id)?;

    let deadline = Instant::now() + GATHER_TIMEOUT;
    while !ice_agent.gathering_done(stream_id) && Instant::now() < deadline {
        ice_agent.tick(Instant::now())?;
        std::thread::sleep(GATHER_POLL_INTERVAL);
    }

    let candidate_attributes: Vec<sdp::Attribute> = ice_agent
        .local_candidates(stream_id, 1)
        .iter()
        .map(webrtc::candidate_attribute)
        .collect();

    let video_description = webrtc::video_media_description(&ice_ufrag, &ice_pwd, candidate_attributes);
    let session_description = webrtc::base_session_description(video_description);

    let sdp_string = session_description.to_string().escape_default().to_string();
    let answer = format!(r#"{{"type": "answer", "sdp": "{}"}}"#, sdp_string);
    println!("{}", base64::encode(&answer));

    Ok(())
}
