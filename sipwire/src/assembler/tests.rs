use proptest::prelude::*;

use super::*;
use crate::headers::parse_numeric;
use crate::message::Method;

// RFC 4475, 3.1.1.1. A Short Tortuous INVITE.
const TORTURE: &str = concat!(
    "INVITE sip:vivekg@chair-dnrc.example.com;unknownparam SIP/2.0\r\n",
    "TO :\r\n",
    " sip:vivekg@chair-dnrc.example.com ;   tag    = 1918181833n\r\n",
    r#"from   : "J Rosenberg \\\""       <sip:jdrosen@example.com>"#,
    "\r\n",
    "  ;\r\n",
    "  tag = 98asjd8\r\n",
    "MaX-fOrWaRdS: 0068\r\n",
    "Call-ID: wsinv.ndaksdj@192.0.2.1\r\n",
    "Content-Length   : 150\r\n",
    "cseq: 0009\r\n",
    "  INVITE\r\n",
    "Via  : SIP  /   2.0\r\n",
    " /UDP\r\n",
    "    192.0.2.2;branch=390skdjuw\r\n",
    "s :\r\n",
    "NewFangledHeader:   newfangled value\r\n",
    " continued newfangled value\r\n",
    "UnknownHeaderWithUnusualValue: ;;,,;;,;\r\n",
    "Content-Type: application/sdp\r\n",
    "Route:\r\n",
    " <sip:services.example.com;lr;unknownwith=value;unknown-no-value>\r\n",
    "v:  SIP  / 2.0  / TCP     spindle.example.com   ;\r\n",
    "  branch  =   z9hG4bK9ikj8  ,\r\n",
    " SIP  /    2.0   / UDP  192.168.255.111   ; branch=\r\n",
    " z9hG4bK30239\r\n",
    r#"m:"Quoted string \"\"" <sip:jdrosen@example.com> ; newparam ="#,
    "\r\n",
    "      newvalue ;\r\n",
    "  secondparam ; q = 0.33\r\n",
    "\r\n",
    "v=0\r\n",
    "o=mhandley 29739 7272939 IN IP4 192.0.2.3\r\n",
    "s=-\r\n",
    "c=IN IP4 192.0.2.4\r\n",
    "t=0 0\r\n",
    "m=audio 49217 RTP/AVP 0 12\r\n",
    "m=video 3227 RTP/AVP 31\r\n",
    "a=rtpmap:31 LPC\r\n",
);

const OPTIONS: &[u8] = b"OPTIONS sip:carol@chicago.com SIP/2.0\r\n\
    Via: SIP/2.0/TCP pc33.atlanta.com;branch=z9hG4bKhjhs8ass877\r\n\
    Max-Forwards: 70\r\n\
    To: <sip:carol@chicago.com>\r\n\
    From: Alice <sip:alice@atlanta.com>;tag=1928301774\r\n\
    Call-ID: a84b4c76e66710\r\n\
    CSeq: 63104 OPTIONS\r\n\
    Accept: application/sdp\r\n\
    Content-Length: 0\r\n\r\n";

const RINGING: &[u8] = b"SIP/2.0 180 Ringing\r\n\
    Via: SIP/2.0/UDP server10.biloxi.com;branch=z9hG4bK4b43c2ff8.1;received=192.0.2.3\r\n\
    To: Bob <sip:bob@biloxi.com>;tag=a6c85cf\r\n\
    From: Alice <sip:alice@atlanta.com>;tag=1928301774\r\n\
    Call-ID: a84b4c76e66710\r\n\
    CSeq: 314159 INVITE\r\n\
    Content-Type: text/plain\r\n\
    Content-Length: 5\r\n\r\n\
    hello";

fn datagram() -> FrameAssembler {
    FrameAssembler::builder().with_datagram_framing().build()
}

/// Feeds `chunks` the way a connection reader would, keeping the unconsumed
/// tail in front of the next chunk.
fn feed_chunks<'a, I>(assembler: &mut FrameAssembler, chunks: I) -> (Vec<Message>, Vec<u8>)
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut messages = Vec::new();
    let mut pending = Vec::new();

    for chunk in chunks {
        pending.extend_from_slice(chunk);
        let consumed = assembler.feed(&pending, &mut messages).unwrap();
        pending.drain(..consumed);
    }

    (messages, pending)
}

fn single(input: &[u8]) -> Message {
    let mut assembler = FrameAssembler::new();
    let mut messages: Vec<Message> = Vec::new();

    let consumed = assembler.feed(input, &mut messages).unwrap();

    assert_eq!(consumed, input.len());
    assert_eq!(messages.len(), 1);
    messages.remove(0)
}

fn assert_torture(message: &Message) {
    let request = message.request().unwrap();
    let headers = &request.headers;

    assert_eq!(request.method(), &Method::Invite);
    assert_eq!(request.uri().domain(), "chair-dnrc.example.com");
    assert!(request.uri().params().contains("unknownparam"));
    assert!(request.faults().is_empty(), "{:?}", request.faults());

    let via = headers.via().unwrap();
    assert_eq!(via.len(), 3);
    assert_eq!(via[0].transport(), "UDP");
    assert_eq!(via[0].branch(), Some("390skdjuw"));
    assert_eq!(via[1].host(), "spindle.example.com");
    assert_eq!(via[1].branch(), Some("z9hG4bK9ikj8"));
    assert_eq!(via[2].host(), "192.168.255.111");
    assert_eq!(via[2].branch(), Some("z9hG4bK30239"));

    let cseq = headers.cseq().unwrap();
    assert_eq!(cseq.seq, 9);
    assert_eq!(cseq.method, Method::Invite);

    assert_eq!(headers.max_forwards(), Some(68));
    assert_eq!(headers.content_length(), Some(150));
    assert_eq!(headers.call_id(), Some("wsinv.ndaksdj@192.0.2.1"));
    assert_eq!(headers.text("subject"), Some(""));
    assert_eq!(headers.text("unknownheaderwithunusualvalue"), Some(";;,,;;,;"));

    let newfangled = headers.text("newfangledheader").unwrap();
    assert!(newfangled.starts_with("newfangled value"));
    assert!(newfangled.ends_with("continued newfangled value"));

    let to = headers.to().unwrap();
    assert_eq!(to.uri().user(), Some("vivekg"));
    assert_eq!(to.tag(), Some("1918181833n"));

    let from = headers.from().unwrap();
    assert_eq!(from.display_name(), Some(r#"J Rosenberg \""#));
    assert_eq!(from.tag(), Some("98asjd8"));

    let contact = &headers.contact().unwrap()[0];
    assert_eq!(contact.display_name(), Some(r#"Quoted string """#));
    assert_eq!(contact.params().get_named("newparam"), Some("newvalue"));
    assert!(contact.params().contains("secondparam"));
    assert_eq!(contact.q(), Some(0.33));

    let route = &headers.route().unwrap()[0];
    assert!(route.is_loose());
    assert_eq!(route.uri().params().get_named("unknownwith"), Some("value"));

    assert!(headers.content_type().unwrap().is("application", "sdp"));
    assert_eq!(request.body.len(), 150);
    assert!(request.body.starts_with(b"v=0\r\n"));
    assert!(request.body.ends_with(b"a=rtpmap:31 LPC\r\n"));
}

#[test_log::test]
fn test_torture_message_stream() {
    let message = single(TORTURE.as_bytes());

    assert_torture(&message);
}

#[test_log::test]
fn test_torture_message_datagram() {
    let mut assembler = datagram();
    let mut messages: Vec<Message> = Vec::new();

    let consumed = assembler.feed(TORTURE.as_bytes(), &mut messages).unwrap();

    assert_eq!(consumed, TORTURE.len());
    assert_eq!(messages.len(), 1);
    assert_torture(&messages[0]);
}

#[test_log::test]
fn test_torture_message_byte_by_byte() {
    let mut assembler = FrameAssembler::new();

    let (messages, rest) = feed_chunks(&mut assembler, TORTURE.as_bytes().chunks(1));

    assert!(rest.is_empty());
    assert_eq!(messages.len(), 1);
    assert_torture(&messages[0]);
}

#[test_log::test]
fn test_via_lines_accumulate() {
    let input = b"BYE sip:bob@biloxi.com SIP/2.0\r\n\
        Via: SIP/2.0/UDP first.example.com;branch=z9hG4bK1\r\n\
        v: SIP/2.0/UDP second.example.com;branch=z9hG4bK2\r\n\
        Max-Forwards: 70\r\n\
        VIA: SIP/2.0/TCP third.example.com;branch=z9hG4bK3, SIP/2.0/TLS fourth.example.com\r\n\
        vIa: SIP/2.0/UDP fifth.example.com;rport\r\n\
        Content-Length: 0\r\n\r\n";

    let message = single(input);
    let via = message.headers().via().unwrap();
    let hosts: Vec<&str> = via.iter().map(|via| via.host()).collect();

    assert_eq!(
        hosts,
        [
            "first.example.com",
            "second.example.com",
            "third.example.com",
            "fourth.example.com",
            "fifth.example.com"
        ]
    );
    assert_eq!(via.top().unwrap().branch(), Some("z9hG4bK1"));
    assert!(via[4].has_rport());
    assert_eq!(via[4].rport(), None);
}

#[test_log::test]
fn test_back_to_back_messages() {
    let mut input = OPTIONS.to_vec();
    input.extend_from_slice(RINGING);
    let mut assembler = FrameAssembler::new();
    let mut messages: Vec<Message> = Vec::new();

    let consumed = assembler.feed(&input, &mut messages).unwrap();

    assert_eq!(consumed, input.len());
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].request().unwrap().method(), &Method::Options);
    assert_matches!(&messages[1], Message::Response(response) => {
        assert_eq!(response.code(), 180);
        assert_eq!(response.reason(), "Ringing");
        assert_eq!(&response.body[..], b"hello");
    });
    assert_eq!(assembler.stage(), Stage::AwaitingStartLine);
}

#[test_log::test]
fn test_partial_line_is_not_consumed() {
    let mut assembler = FrameAssembler::new();
    let mut messages: Vec<Message> = Vec::new();

    assert_eq!(assembler.feed(b"OPTIONS sip:carol@chic", &mut messages), Ok(0));
    assert_eq!(assembler.stage(), Stage::AwaitingStartLine);

    let input = b"OPTIONS sip:carol@chicago.com SIP/2.0\r\nMax-Forwards: 70\r\n";
    // The last header line may still be folded.
    let consumed = assembler.feed(input, &mut messages).unwrap();

    assert_eq!(consumed, input.len() - b"Max-Forwards: 70\r\n".len());
    assert_eq!(assembler.stage(), Stage::AwaitingHeaders);
    assert!(messages.is_empty());
}

#[test_log::test]
fn test_body_across_feeds() {
    let (head, body) = RINGING.split_at(RINGING.len() - 3);
    let mut assembler = FrameAssembler::new();

    let (messages, _) = feed_chunks(&mut assembler, [head]);
    assert!(messages.is_empty());
    assert_eq!(assembler.stage(), Stage::AwaitingBody { remaining: 3 });

    let (messages, rest) = feed_chunks(&mut assembler, [body]);
    assert!(rest.is_empty());
    assert_eq!(messages.len(), 1);
    assert_eq!(&messages[0].body()[..], b"hello");
}

#[test_log::test]
fn test_keep_alive_lines_are_skipped() {
    let mut assembler = FrameAssembler::new();
    let mut messages: Vec<Message> = Vec::new();

    assert_eq!(assembler.feed(b"\r\n\r\n", &mut messages), Ok(4));
    assert_eq!(assembler.stage(), Stage::AwaitingStartLine);

    let mut input = b"\r\n\r\n".to_vec();
    input.extend_from_slice(OPTIONS);
    input.extend_from_slice(b"\r\n\r\n");
    input.extend_from_slice(OPTIONS);

    assert_eq!(assembler.feed(&input, &mut messages), Ok(input.len()));
    assert_eq!(messages.len(), 2);
}

#[test_log::test]
fn test_missing_content_length_on_stream() {
    let input = b"ACK sip:bob@biloxi.com SIP/2.0\r\nCSeq: 1 ACK\r\n\r\n";

    let message = single(input);

    assert!(message.body().is_empty());
    assert_eq!(message.headers().content_length(), None);
}

#[test_log::test]
fn test_start_line_fault_then_resync() {
    let mut assembler = FrameAssembler::new();
    let mut messages: Vec<Message> = Vec::new();
    let garbage = b"this is not sip\r\n";
    let mut input = garbage.to_vec();
    input.extend_from_slice(b"Via: SIP/2.0/UDP 192.0.2.1\r\nCSeq: 1 INVITE\r\n\r\n");
    input.extend_from_slice(OPTIONS);

    let err = assembler.feed(&input, &mut messages).unwrap_err();

    assert_eq!(err.consumed, garbage.len());
    assert_matches!(err.fault, FramingFault::StartLine(_));
    assert_eq!(assembler.stage(), Stage::Resync);

    let rest = &input[err.consumed..];
    assert_eq!(assembler.feed(rest, &mut messages), Ok(rest.len()));
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].request().unwrap().method(), &Method::Options);
}

#[test_log::test]
fn test_invalid_content_length_is_framing_fault() {
    let mut assembler = FrameAssembler::new();
    let mut messages: Vec<Message> = Vec::new();
    let input = b"MESSAGE sip:bob@biloxi.com SIP/2.0\r\nContent-Length: ten\r\nCSeq: 1 MESSAGE\r\n\r\nhello";

    let err = assembler.feed(input, &mut messages).unwrap_err();

    assert_matches!(err.fault, FramingFault::ContentLength(_));
    assert_eq!(
        err.consumed,
        b"MESSAGE sip:bob@biloxi.com SIP/2.0\r\nContent-Length: ten\r\n".len()
    );
    assert!(messages.is_empty());
    assert_eq!(assembler.stage(), Stage::Resync);
}

#[test_log::test]
fn test_start_line_too_long() {
    let mut assembler = FrameAssembler::builder().with_max_line_len(32).build();
    let mut messages: Vec<Message> = Vec::new();
    let input = [b'A'; 64];

    let err = assembler.feed(&input, &mut messages).unwrap_err();

    assert_eq!(err.consumed, input.len());
    assert_eq!(err.fault, FramingFault::LineTooLong { limit: 32 });

    // Long lines are skipped while resyncing.
    assert_eq!(assembler.feed(&input, &mut messages), Ok(input.len()));
    assert_eq!(assembler.stage(), Stage::Resync);
}

#[test_log::test]
fn test_header_line_too_long() {
    let mut assembler = FrameAssembler::builder().with_max_line_len(64).build();
    let mut messages: Vec<Message> = Vec::new();
    let mut input = b"OPTIONS sip:carol@chicago.com SIP/2.0\r\nSubject: ".to_vec();
    input.extend_from_slice(&[b'x'; 100]);
    input.extend_from_slice(b"\r\nContent-Length: 0\r\n\r\n");

    let err = assembler.feed(&input, &mut messages).unwrap_err();

    assert_eq!(err.fault, FramingFault::LineTooLong { limit: 64 });
    assert!(messages.is_empty());
}

#[test_log::test]
fn test_body_too_large() {
    let mut assembler = FrameAssembler::builder().with_max_body_len(10).build();
    let mut messages: Vec<Message> = Vec::new();
    let input = b"MESSAGE sip:bob@biloxi.com SIP/2.0\r\nContent-Length: 11\r\n\r\nhello world";

    let err = assembler.feed(input, &mut messages).unwrap_err();

    assert_eq!(err.fault, FramingFault::BodyTooLarge { length: 11, limit: 10 });
    assert!(messages.is_empty());
}

const BAD_HEADERS: &[u8] = b"REGISTER sip:registrar.biloxi.com SIP/2.0\r\n\
    Via: SIP/2.0/UDP bobspc.biloxi.com:5060;branch=z9hG4bKnashds7\r\n\
    Max-Forwards: seventy\r\n\
    Via: not a via\r\n\
    CSeq: 1826 REGISTER\r\n\
    Content-Length: 0\r\n\r\n";

#[test_log::test]
fn test_header_fault_keeps_raw_value() {
    let message = single(BAD_HEADERS);
    let request = message.request().unwrap();

    assert_eq!(request.faults().len(), 2);
    assert_eq!(request.faults()[0].name, "Max-Forwards");
    assert_eq!(request.faults()[0].value, "seventy");
    assert_eq!(request.faults()[1].name, "Via");

    assert_eq!(request.headers.text("max-forwards"), Some("seventy"));
    // The Via parsed earlier is kept.
    assert_eq!(request.headers.via().unwrap().len(), 1);
    assert_eq!(request.headers.cseq().unwrap().seq, 1826);
}

#[test_log::test]
fn test_header_fault_drop_policy() {
    let mut assembler = FrameAssembler::builder()
        .with_header_fault_policy(HeaderFaultPolicy::Drop)
        .build();
    let mut messages: Vec<Message> = Vec::new();

    assembler.feed(BAD_HEADERS, &mut messages).unwrap();

    let request = messages[0].request().unwrap();
    assert_eq!(request.faults().len(), 2);
    assert!(!request.headers.contains("max-forwards"));
    assert_eq!(request.headers.via().unwrap().len(), 1);
}

#[test_log::test]
fn test_header_without_colon() {
    let input = b"OPTIONS sip:carol@chicago.com SIP/2.0\r\nThis line has no colon\r\nCall-ID: abc\r\n\r\n";

    let message = single(input);

    assert_eq!(message.faults().len(), 1);
    assert_eq!(message.faults()[0].name, "This");
    assert_eq!(message.headers().call_id(), Some("abc"));
}

#[test_log::test]
fn test_contact_wildcard_does_not_mix_with_addresses() {
    let input = b"REGISTER sip:registrar.biloxi.com SIP/2.0\r\n\
        Contact: <sip:bob@192.0.2.4>\r\n\
        Contact: *\r\n\
        Expires: 0\r\n\
        Content-Length: 0\r\n\r\n";

    let message = single(input);

    assert_eq!(message.faults().len(), 1);
    assert_eq!(message.faults()[0].name, "Contact");
    assert_eq!(message.faults()[0].value, "*");

    let contacts = message.headers().contact().unwrap();
    assert!(!contacts.is_wildcard());
    assert_eq!(contacts.len(), 1);
}

#[test_log::test]
fn test_custom_registry() {
    let registry = HeaderRegistry::builder()
        .register_parser("X-Retries", Some('x'), |value| parse_numeric(value).map(Header::Numeric))
        .build();
    let mut assembler = FrameAssembler::builder().with_registry(Arc::new(registry)).build();
    let mut messages: Vec<Message> = Vec::new();
    let input = b"OPTIONS sip:carol@chicago.com SIP/2.0\r\nx: 3\r\nContent-Length: 0\r\n\r\n";

    assembler.feed(input, &mut messages).unwrap();

    assert_eq!(messages[0].headers().numeric("x-retries"), Some(3));
}

#[test_log::test]
fn test_datagram_discards_trailing_bytes() {
    let mut assembler = datagram();
    let mut messages: Vec<Message> = Vec::new();
    let input = b"MESSAGE sip:bob@biloxi.com SIP/2.0\r\nContent-Length: 4\r\n\r\nabcdEXTRA";

    assert_eq!(assembler.feed(input, &mut messages), Ok(input.len()));
    assert_eq!(&messages[0].body()[..], b"abcd");
    assert_eq!(assembler.stage(), Stage::AwaitingStartLine);
}

#[test_log::test]
fn test_datagram_body_without_content_length() {
    let mut assembler = datagram();
    let mut messages: Vec<Message> = Vec::new();
    let input = b"MESSAGE sip:bob@biloxi.com SIP/2.0\r\nCall-ID: 1\r\n\r\nWatson, come here.";

    assembler.feed(input, &mut messages).unwrap();

    assert_eq!(&messages[0].body()[..], b"Watson, come here.");
}

#[test_log::test]
fn test_datagram_truncated_body() {
    let mut assembler = datagram();
    let mut messages: Vec<Message> = Vec::new();
    let input = b"MESSAGE sip:bob@biloxi.com SIP/2.0\r\nContent-Length: 10\r\n\r\nabc";

    let err = assembler.feed(input, &mut messages).unwrap_err();

    assert_eq!(err.consumed, input.len());
    assert_eq!(err.fault, FramingFault::TruncatedBody { expected: 10, received: 3 });
    assert_eq!(assembler.stage(), Stage::AwaitingStartLine);

    // The next datagram starts clean.
    assembler.feed(RINGING, &mut messages).unwrap();
    assert_eq!(messages.len(), 1);
}

#[test_log::test]
fn test_datagram_unterminated_headers() {
    let mut assembler = datagram();
    let mut messages: Vec<Message> = Vec::new();
    let input = b"OPTIONS sip:carol@chicago.com SIP/2.0\r\nCall-ID: 1\r\n";

    let err = assembler.feed(input, &mut messages).unwrap_err();

    assert_eq!(err.fault, FramingFault::UnterminatedHeaders);
    assert!(messages.is_empty());
}

#[test_log::test]
fn test_abandon_discards_partial_message() {
    let mut assembler = FrameAssembler::new();
    let mut messages: Vec<Message> = Vec::new();
    let (head, _) = RINGING.split_at(60);

    assembler.feed(head, &mut messages).unwrap();
    assert_eq!(assembler.stage(), Stage::AwaitingHeaders);

    assembler.abandon();
    assert_eq!(assembler.stage(), Stage::AwaitingStartLine);

    assert_eq!(assembler.feed(OPTIONS, &mut messages), Ok(OPTIONS.len()));
    assert_eq!(messages.len(), 1);
    assert!(messages[0].is_request());
}

#[test]
fn test_unfold() {
    assert_eq!(&*unfold(b"Subject: a\r\n"), b"Subject: a");
    assert_eq!(&*unfold(b"Subject: a\r\n b\r\n\tc\r\n"), b"Subject: a  b \tc");
}

#[test]
fn test_logical_line_waits_for_next_byte() {
    assert_eq!(logical_line(b"Call-ID: 1\r\n", false), None);
    assert_eq!(logical_line(b"Call-ID: 1\r\n", true), Some(12));
    assert_eq!(logical_line(b"Call-ID: 1\r\n 2\r\nX", false), Some(16));
}

proptest! {
    #[test]
    fn test_split_point_does_not_change_result(first in 0..=TORTURE.len(), second in 0..=TORTURE.len()) {
        let mut input = TORTURE.as_bytes().to_vec();
        input.extend_from_slice(RINGING);
        let (a, b) = (first.min(second), first.max(second) + RINGING.len());

        let mut whole = FrameAssembler::new();
        let (expected, _) = feed_chunks(&mut whole, [&input[..]]);

        let mut split = FrameAssembler::new();
        let (messages, rest) = feed_chunks(&mut split, [&input[..a], &input[a..b], &input[b..]]);

        prop_assert!(rest.is_empty());
        prop_assert_eq!(messages.len(), 2);
        prop_assert_eq!(messages, expected);
    }
}
