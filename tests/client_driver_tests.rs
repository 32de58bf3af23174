//! End-to-end test of the capture/playback client driver against the real
//! server, with scripted capture and a recording playback device.

mod mock_providers;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use solace_gateway::client::{
    AudioCapture, AudioPlayback, SessionClient, SessionClientConfig,
};

use mock_providers::{MockChat, MockSTT, MockTTS, mock_state, spawn_server};

/// Capture source that yields a scripted list of utterances, then reports
/// exhaustion (which ends the session).
struct ScriptedCapture {
    utterances: VecDeque<Bytes>,
    stopped: Arc<Mutex<bool>>,
}

#[async_trait]
impl AudioCapture for ScriptedCapture {
    async fn next_utterance(&mut self) -> Option<Bytes> {
        self.utterances.pop_front()
    }

    fn stop(&mut self) {
        *self.stopped.lock().unwrap() = true;
    }
}

/// Playback device that records everything it is asked to play.
struct RecordingPlayback {
    played: Arc<Mutex<Vec<Bytes>>>,
}

#[async_trait]
impl AudioPlayback for RecordingPlayback {
    async fn play(&mut self, audio: Bytes) {
        self.played.lock().unwrap().push(audio);
    }

    fn stop(&mut self) {}
}

#[tokio::test]
async fn test_client_completes_two_turns_and_ends_session() {
    let tts_audio: &'static [u8] = b"reply audio bytes";
    let chat = MockChat::replying("I hear you.");
    let state = mock_state(
        MockSTT::fixed("I feel anxious today"),
        chat.clone(),
        MockTTS::fixed(tts_audio),
    );
    let addr = spawn_server(state).await;

    let played = Arc::new(Mutex::new(Vec::new()));
    let stopped = Arc::new(Mutex::new(false));

    let capture = ScriptedCapture {
        utterances: VecDeque::from(vec![
            Bytes::from_static(b"utterance one"),
            Bytes::from_static(b"utterance two"),
        ]),
        stopped: stopped.clone(),
    };
    let playback = RecordingPlayback {
        played: played.clone(),
    };

    let client = SessionClient::new(
        SessionClientConfig::new(format!("ws://{addr}/session"), format!("http://{addr}")),
        capture,
        playback,
    );

    let shutdown = CancellationToken::new();
    tokio::time::timeout(Duration::from_secs(10), client.run(shutdown))
        .await
        .expect("client run timed out")
        .expect("client run failed");

    // Both replies were fetched from their locators and played in order
    let played = played.lock().unwrap();
    assert_eq!(played.len(), 2);
    assert!(played.iter().all(|audio| audio.as_ref() == tts_audio));

    // Capture hardware was released when the session ended
    assert!(*stopped.lock().unwrap());

    // The server-side history grew across turns: the second prompt carries
    // the first exchange
    let prompts = chat.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0].len(), 2);
    assert_eq!(prompts[1].len(), 4);
}

#[tokio::test]
async fn test_client_shutdown_mid_processing_plays_nothing() {
    // The pipeline is slow; the user ends the session before the reply
    // arrives, so the late reply must not be played.
    let stt = MockSTT::slow(Duration::from_millis(600), "hello");
    let state = mock_state(
        stt,
        MockChat::replying("late reply"),
        MockTTS::fixed(b"late audio"),
    );
    let addr = spawn_server(state).await;

    let played = Arc::new(Mutex::new(Vec::new()));
    let stopped = Arc::new(Mutex::new(false));

    let capture = ScriptedCapture {
        utterances: VecDeque::from(vec![Bytes::from_static(b"utterance")]),
        stopped: stopped.clone(),
    };
    let playback = RecordingPlayback {
        played: played.clone(),
    };

    let client = SessionClient::new(
        SessionClientConfig::new(format!("ws://{addr}/session"), format!("http://{addr}")),
        capture,
        playback,
    );

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        trigger.cancel();
    });

    tokio::time::timeout(Duration::from_secs(5), client.run(shutdown))
        .await
        .expect("client run timed out")
        .expect("client run failed");

    assert!(played.lock().unwrap().is_empty(), "stale reply was played");
    assert!(*stopped.lock().unwrap());
}

#[tokio::test]
async fn test_client_resumes_listening_after_server_error() {
    // First stage fails server-side; the client gets an error message and
    // must resolve back to listening, then end cleanly when the script runs
    // out.
    let state = mock_state(
        MockSTT::failing("transcription down"),
        MockChat::replying("unused"),
        MockTTS::fixed(b"unused"),
    );
    let addr = spawn_server(state).await;

    let played = Arc::new(Mutex::new(Vec::new()));
    let stopped = Arc::new(Mutex::new(false));

    let capture = ScriptedCapture {
        utterances: VecDeque::from(vec![Bytes::from_static(b"utterance")]),
        stopped: stopped.clone(),
    };
    let playback = RecordingPlayback {
        played: played.clone(),
    };

    let client = SessionClient::new(
        SessionClientConfig::new(format!("ws://{addr}/session"), format!("http://{addr}")),
        capture,
        playback,
    );

    tokio::time::timeout(Duration::from_secs(5), client.run(CancellationToken::new()))
        .await
        .expect("client run timed out")
        .expect("client run failed");

    assert!(played.lock().unwrap().is_empty());
    assert!(*stopped.lock().unwrap());
}
