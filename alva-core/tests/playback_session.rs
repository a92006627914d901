//! End-to-end playback sessions against a loopback "console".

use std::net::UdpSocket;
use std::time::Duration;

use alva_core::osc_client::{encode_string_message, OscConsole};
use alva_core::playback::{on_frame_change, on_playback_start, on_playback_stop, PlaybackState};
use alva_core::show::Show;
use alva_types::{FrameRate, MacroStrip, PlaybackSettings, Strip, StripKind, TriggerStrip};
use rosc::{OscPacket, OscType};

/// A UDP listener standing in for the console.
struct FakeConsole {
    socket: UdpSocket,
}

impl FakeConsole {
    fn bind() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").expect("bind listener");
        socket
            .set_read_timeout(Some(Duration::from_millis(200)))
            .expect("set timeout");
        Self { socket }
    }

    fn port(&self) -> u16 {
        self.socket.local_addr().expect("local addr").port()
    }

    /// Drain every datagram currently queued, decoded to (address, argument).
    fn received(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        let mut buf = [0u8; 2048];
        while let Ok(n) = self.socket.recv(&mut buf) {
            assert_eq!(n % 4, 0, "datagram not 4-byte aligned");
            out.push(decode(&buf[..n]));
        }
        out
    }
}

fn decode(bytes: &[u8]) -> (String, String) {
    let (_, packet) = rosc::decoder::decode_udp(bytes).expect("valid OSC");
    match packet {
        OscPacket::Message(msg) => match msg.args.as_slice() {
            [OscType::String(arg)] => (msg.addr, arg.clone()),
            other => panic!("unexpected args {:?}", other),
        },
        OscPacket::Bundle(_) => panic!("unexpected bundle"),
    }
}

fn quiet_settings() -> PlaybackSettings {
    PlaybackSettings {
        livemap_armed: false,
        sync_timecode: false,
        ..Default::default()
    }
}

#[test]
fn codec_roundtrips_through_reference_decoder() {
    let cases = [
        ("/eos/newcmd", "Go_to_Cue 5 Enter"),
        ("eos/macro/fire", "12"),
        ("/abc", ""),
        ("/a", "abcd"),
        ("/eos/newcmd", "Event 1 / Internal Time 00:00:01:00 Enter"),
    ];
    for (address, argument) in cases {
        let bytes = encode_string_message(address, argument).unwrap();
        assert_eq!(bytes.len() % 4, 0);
        let (addr, arg) = decode(&bytes);
        assert_eq!(addr.trim_start_matches('/'), address.trim_start_matches('/'));
        assert!(addr.starts_with('/'));
        assert_eq!(arg, argument);
    }
}

#[test]
fn macro_and_trigger_fire_together() {
    let listener = FakeConsole::bind();
    let console = OscConsole::new("127.0.0.1", listener.port()).unwrap();
    let strips = vec![
        Strip::new(
            "A",
            10,
            40,
            StripKind::Macro(MacroStrip {
                start_frame_macro_text: "Go_to_Cue 5 Enter".to_string(),
                ..Default::default()
            }),
        ),
        Strip::new(
            "B",
            10,
            40,
            StripKind::Trigger(TriggerStrip {
                trigger_prefix: "/eos/newcmd".to_string(),
                osc_trigger: "Group 1 At Full Enter".to_string(),
                ..Default::default()
            }),
        ),
    ];

    let mut state = PlaybackState::new(quiet_settings(), FrameRate::default());
    on_playback_start(&mut state, &console, &strips, 0);
    let report = on_frame_change(&mut state, &console, 10);
    assert_eq!(report.sent, 2);

    assert_eq!(
        listener.received(),
        vec![
            ("/eos/newcmd".to_string(), "Go_to_Cue 5 Enter".to_string()),
            ("/eos/newcmd".to_string(), "Group 1 At Full Enter".to_string()),
        ]
    );
}

#[test]
fn full_session_from_show_file() {
    let show = Show::from_json(
        r#"{
            "frame_rate": {"fps": 30},
            "frame_current": 0,
            "strips": [
                {"name": "song", "frame_start": 0, "frame_final_end": 300,
                 "kind": "Sound", "song_timecode_clock_number": 4},
                {"name": "opening", "frame_start": 0, "frame_final_end": 100,
                 "kind": "Cue", "eos_cue_number": 1},
                {"name": "sweep", "frame_start": 5, "frame_final_end": 8,
                 "kind": "Trigger", "trigger_prefix": "eos/newcmd",
                 "osc_trigger": "Chan 1 at Full Enter",
                 "osc_trigger_end": "Chan 1 thru 3 at 0 Enter",
                 "friend_list": "1 thru 3"}
            ]
        }"#,
    )
    .unwrap();

    let listener = FakeConsole::bind();
    let console = OscConsole::new("127.0.0.1", listener.port()).unwrap();
    let settings = PlaybackSettings {
        house_down_on_play: true,
        house_up_on_stop: true,
        ..Default::default()
    };
    let mut state = PlaybackState::new(settings, show.frame_rate);

    on_playback_start(&mut state, &console, &show.strips, show.frame_current);
    for frame in 1..=10 {
        on_frame_change(&mut state, &console, frame);
    }
    on_playback_stop(&mut state, &console);
    on_playback_stop(&mut state, &console);

    let args: Vec<String> = listener.received().into_iter().map(|(_, arg)| arg).collect();
    assert_eq!(
        args,
        vec![
            "500 at 1 Enter",
            "Event 4 / Internal Time 00:00:00:00 Enter, Event 4 / Internal Enable Enter",
            "Go_to_Cue 1 Time 1 Enter",
            // frame 5: start then the first offset
            "Chan 1 at Full Enter",
            "Chan 1 at Full Enter",
            "Chan 2 at Full Enter",
            "Chan 3 at Full Enter",
            // frame 8: end edge
            "Chan 1 thru 3 at 0 Enter",
            "500 at 75 Enter",
            "Event 4 / Internal Disable Enter",
        ]
    );
}

#[test]
fn unreachable_console_does_not_break_playback() {
    // Port 9 on a TEST-NET address: sends either succeed silently or fail
    // locally, and both must leave the session running.
    let console = OscConsole::new("192.0.2.1", 9).unwrap();
    let strips = vec![Strip::new(
        "t",
        1,
        5,
        StripKind::Trigger(TriggerStrip {
            trigger_prefix: "/eos/newcmd".to_string(),
            osc_trigger: "Go".to_string(),
            ..Default::default()
        }),
    )];
    let mut state = PlaybackState::new(quiet_settings(), FrameRate::default());
    on_playback_start(&mut state, &console, &strips, 0);
    let report = on_frame_change(&mut state, &console, 1);
    assert_eq!(report.sent + report.failed, 1);
    assert!(state.is_playing());
    on_playback_stop(&mut state, &console);
    assert!(!state.is_playing());
}
