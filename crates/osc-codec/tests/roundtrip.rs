//! osc-codec ラウンドトリップ性質テスト（proptest）
//!
//! 任意のメッセージ・入れ子バンドルについて
//! `from_bytes(to_bytes(x)) == x` と 4 バイト境界が成り立つことを確認する。
//! NUL を含む文字列はエンコード時に拒否されることも確認する。

use osc_codec::codec::validate;
use osc_codec::{
    Argument, ArgumentError, Bundle, Message, MidiMessage, OscError, Packet, Rgba, TimeTag,
    DEFAULT_MAX_DEPTH,
};
use proptest::prelude::*;

fn address() -> impl Strategy<Value = String> {
    "(/[a-zA-Z0-9_*?]{1,12}){1,4}"
}

/// NaN は PartialEq で一致しないため除外する
fn argument() -> impl Strategy<Value = Argument> {
    prop_oneof![
        any::<i32>().prop_map(Argument::Int),
        any::<f32>()
            .prop_filter("NaN は比較不能", |f| !f.is_nan())
            .prop_map(Argument::Float),
        "[\\x00 -~]{0,16}".prop_map(Argument::String),
        "[\\x00a-z]{0,8}".prop_map(Argument::Symbol),
        proptest::collection::vec(any::<u8>(), 0..24).prop_map(Argument::Blob),
        any::<i64>().prop_map(Argument::Long),
        any::<f64>()
            .prop_filter("NaN は比較不能", |f| !f.is_nan())
            .prop_map(Argument::Double),
        any::<u64>().prop_map(|t| Argument::TimeTag(TimeTag(t))),
        any::<char>().prop_map(Argument::Char),
        any::<[u8; 4]>().prop_map(|[red, green, blue, alpha]| Argument::Color(Rgba {
            red,
            green,
            blue,
            alpha
        })),
        any::<[u8; 4]>().prop_map(|[port, status, data1, data2]| Argument::Midi(MidiMessage {
            port,
            status,
            data1,
            data2
        })),
        Just(Argument::True),
        Just(Argument::False),
        Just(Argument::Nil),
        Just(Argument::Impulse),
    ]
}

fn message() -> impl Strategy<Value = Message> {
    (address(), proptest::collection::vec(argument(), 0..8)).prop_map(|(addr, args)| {
        let mut msg = Message::new(&addr).unwrap();
        msg.args = args;
        msg
    })
}

/// 深さ 4 までの入れ子バンドルを含むパケット
fn packet() -> impl Strategy<Value = Packet> {
    let leaf = message().prop_map(Packet::Message);
    leaf.prop_recursive(4, 32, 4, |inner| {
        (any::<u64>(), proptest::collection::vec(inner, 0..4)).prop_map(|(t, elements)| {
            Packet::Bundle(Bundle {
                timetag: TimeTag(t),
                elements,
            })
        })
    })
}

fn encodable(msg: &Message) -> bool {
    msg.args.iter().all(|arg| validate(arg).is_ok())
}

const NUL_REJECTED: OscError = OscError::MalformedArgument(ArgumentError::ContainsNul);

proptest! {
    #[test]
    fn message_roundtrip(msg in message()) {
        if !encodable(&msg) {
            prop_assert_eq!(msg.to_bytes(), Err(NUL_REJECTED));
            return Ok(());
        }
        let bytes = msg.to_bytes().unwrap();
        prop_assert_eq!(bytes.len() % 4, 0);
        prop_assert_eq!(bytes.len(), msg.encoded_len());
        prop_assert_eq!(Message::from_bytes(&bytes), Ok(msg));
    }

    #[test]
    fn packet_roundtrip(packet in packet()) {
        if !packet.messages().all(|(_, msg)| encodable(msg)) {
            prop_assert_eq!(packet.to_bytes(), Err(NUL_REJECTED));
            return Ok(());
        }
        let bytes = packet.to_bytes().unwrap();
        prop_assert_eq!(bytes.len() % 4, 0);
        prop_assert_eq!(bytes.len(), packet.encoded_len());
        prop_assert_eq!(Packet::from_bytes(&bytes), Ok(packet));
    }

    /// 任意のバイト列でパニックしない
    #[test]
    fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
        let _ = Packet::from_bytes(&bytes);
    }
}

#[test]
fn deep_nesting_is_rejected_without_stack_overflow() {
    let mut bundle = Bundle::new().with_element(Message::new("/leaf").unwrap());
    for _ in 0..DEFAULT_MAX_DEPTH {
        bundle = Bundle::new().with_element(bundle);
    }
    let bytes = Packet::from(bundle).to_bytes().unwrap();
    assert!(matches!(
        Packet::from_bytes(&bytes),
        Err(OscError::MalformedBundle(_))
    ));
}
