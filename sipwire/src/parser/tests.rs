use super::*;

macro_rules! uri_test_ok {
    (name: $name:ident, input: $input:literal, scheme: $scheme:expr, user: $user:expr, domain: $domain:literal, port: $port:expr) => {
        uri_test_ok! {
            name: $name,
            input: $input,
            scheme: $scheme,
            user: $user,
            domain: $domain,
            port: $port,
            params: []
        }
    };
    (name: $name:ident, input: $input:literal, scheme: $scheme:expr, user: $user:expr, domain: $domain:literal, port: $port:expr, params: [$(($pname:literal, $pvalue:expr)),*]) => {
        #[test]
        fn $name() -> ParseResult<()> {
            let uri = Parser::new($input).parse_uri(true)?;

            assert_eq!(uri.scheme(), $scheme);
            assert_eq!(uri.user(), $user);
            assert_eq!(uri.domain(), $domain);
            assert_eq!(uri.port(), $port);
            $(
                assert_eq!(uri.params().get_named($pname), $pvalue);
                assert!(uri.params().contains($pname));
            )*

            Ok(())
        }
    };
}

macro_rules! uri_test_err {
    (name: $name:ident, input: $input:literal) => {
        #[test]
        fn $name() {
            assert_matches!($input.parse::<SipUri>(), Err(_));
        }
    };
}

uri_test_ok! {
    name: uri_test_host_only,
    input: "sip:biloxi.com",
    scheme: Some(Scheme::Sip),
    user: None,
    domain: "biloxi.com",
    port: None
}

uri_test_ok! {
    name: uri_test_host_port,
    input: "sip:biloxi.com:5060",
    scheme: Some(Scheme::Sip),
    user: None,
    domain: "biloxi.com",
    port: Some(5060)
}

uri_test_ok! {
    name: uri_test_user_host_port,
    input: "sip:a@b:5060",
    scheme: Some(Scheme::Sip),
    user: Some("a"),
    domain: "b",
    port: Some(5060)
}

uri_test_ok! {
    name: uri_test_mixed_case_scheme,
    input: "SiPs:alice@atlanta.com;transport=TCP",
    scheme: Some(Scheme::Sips),
    user: Some("alice"),
    domain: "atlanta.com",
    port: None,
    params: [("transport", Some("TCP"))]
}

uri_test_ok! {
    name: uri_test_lowercases_param_names,
    input: "sip:alice@192.168.1.1;LR;Maddr=239.255.255.1;ttl=15",
    scheme: Some(Scheme::Sip),
    user: Some("alice"),
    domain: "192.168.1.1",
    port: None,
    params: [("lr", None), ("maddr", Some("239.255.255.1")), ("ttl", Some("15"))]
}

uri_test_ok! {
    name: uri_test_escaped_user,
    input: "sip:%61lice;phone-context=x@atlanta.com",
    scheme: Some(Scheme::Sip),
    user: Some("%61lice;phone-context=x"),
    domain: "atlanta.com",
    port: None
}

uri_test_ok! {
    name: uri_test_ipv6,
    input: "sip:[2001:db8::10]:5070",
    scheme: Some(Scheme::Sip),
    user: None,
    domain: "[2001:db8::10]",
    port: Some(5070)
}

uri_test_ok! {
    name: uri_test_tel,
    input: "tel:+1-201-555-0123",
    scheme: Some(Scheme::Tel),
    user: None,
    domain: "+1-201-555-0123",
    port: None
}

uri_test_ok! {
    name: uri_test_mailto,
    input: "mailto:watson@bell-telephone.com",
    scheme: Some(Scheme::Mailto),
    user: Some("watson"),
    domain: "bell-telephone.com",
    port: None
}

uri_test_ok! {
    name: uri_test_without_scheme,
    input: "alice@atlanta.com",
    scheme: None,
    user: Some("alice"),
    domain: "atlanta.com",
    port: None
}

uri_test_ok! {
    name: uri_test_quoted_param,
    input: "sip:bob@biloxi.com;info=\"a b\"",
    scheme: Some(Scheme::Sip),
    user: Some("bob"),
    domain: "biloxi.com",
    port: None,
    params: [("info", Some("a b"))]
}

uri_test_err! {
    name: uri_test_err_empty_host,
    input: "sip:"
}

uri_test_err! {
    name: uri_test_err_bad_port,
    input: "sip:alice@atlanta.com:abc"
}

uri_test_err! {
    name: uri_test_err_port_overflow,
    input: "sip:alice@atlanta.com:70000"
}

uri_test_err! {
    name: uri_test_err_bad_ipv6,
    input: "sip:[2001:zz::1]"
}

uri_test_err! {
    name: uri_test_err_empty_param,
    input: "sip:alice@atlanta.com;;lr"
}

uri_test_err! {
    name: uri_test_err_unterminated_quote,
    input: "sip:alice@atlanta.com;info=\"abc"
}

#[test]
fn test_uri_headers_kept_raw() {
    let uri: SipUri = "sips:alice@atlanta.com?subject=project%20x&priority=urgent".parse().unwrap();

    assert_eq!(uri.headers(), Some("subject=project%20x&priority=urgent"));
    assert!(uri.params().is_empty());
}

#[test]
fn test_bare_uri_stops_at_semicolon() {
    let mut parser = Parser::new("sip:alice@atlanta.com;tag=1928301774");
    let uri = parser.parse_uri(false).unwrap();

    assert!(uri.params().is_empty());
    assert_eq!(parser.remaining(), b";tag=1928301774");
}

#[test]
fn test_parse_request_line() {
    let line = Parser::new("INVITE sip:vivekg@chair-dnrc.example.com;unknownparam SIP/2.0")
        .parse_start_line()
        .unwrap();

    assert_matches!(line, StartLine::Request(RequestLine { method: Method::Invite, uri, version }) => {
        assert_eq!(uri.domain(), "chair-dnrc.example.com");
        assert!(uri.params().contains("unknownparam"));
        assert_eq!(version, "SIP/2.0");
    });
}

#[test]
fn test_parse_request_line_extension_method() {
    let line = Parser::new("NEWMETHOD sip:user@example.com SIP/2.0").parse_start_line().unwrap();

    assert_matches!(line, StartLine::Request(req) => {
        assert_eq!(req.method, Method::Other("NEWMETHOD".into()));
    });
}

#[test]
fn test_parse_status_line() {
    let line = Parser::new("SIP/2.0 486 Busy Here").parse_start_line().unwrap();

    assert_matches!(line, StartLine::Response(StatusLine { code: 486, reason, .. }) => {
        assert_eq!(reason, "Busy Here");
    });
}

#[test]
fn test_parse_status_line_empty_reason() {
    let line = Parser::new("SIP/2.0 200").parse_start_line().unwrap();

    assert_matches!(line, StartLine::Response(StatusLine { code: 200, reason, .. }) => {
        assert!(reason.is_empty());
    });
}

#[test]
fn test_parse_start_line_errors() {
    for line in [
        "SIP/2.0 99 Too Low",
        "SIP/2.0 2000 OK",
        "SIP/2.0 OK",
        "SIP/x.y 200 OK",
        "INVITE sip:bob@biloxi.com",
        "INVITE sip:bob@biloxi.com HTTP/1.1",
        "INVITE  SIP/2.0",
        "!!!garbage",
        "",
    ] {
        assert_matches!(Parser::new(line).parse_start_line(), Err(_), "{line}");
    }
}

#[test]
fn test_parse_header_params_with_whitespace() {
    let mut parser = Parser::new(" ;  tag = 98asjd8 ; lr ;q=\"0.5\"");
    let params = parser.parse_header_params().unwrap();

    assert_eq!(params.len(), 3);
    assert_eq!(params.get_named("tag"), Some("98asjd8"));
    assert!(params.contains("lr"));
    assert_eq!(params.get_named("q"), Some("0.5"));
    assert!(parser.finish().is_ok());
}

#[test]
fn test_trim() {
    assert_eq!(trim(b" \t value \t"), b"value");
    assert_eq!(trim(b"   "), b"");
}

#[test]
fn test_parse_register_with_credentials() {
    let msg = b"REGISTER sip:biloxi.com SIP/2.0\r\n\
        Via: SIP/2.0/UDP bobspc.biloxi.com:5060;branch=z9hG4bKnashds7\r\n\
        Max-Forwards: 70\r\n\
        To: Bob <sip:bob@biloxi.com>\r\n\
        From: Bob <sip:bob@biloxi.com>;tag=456248\r\n\
        Call-ID: 843817637684230@998sdasdh09\r\n\
        CSeq: 1826 REGISTER\r\n\
        Contact: <sip:bob@192.0.2.4>;expires=7200\r\n\
        Authorization: Digest username=\"bob\", realm=\"biloxi.com\", \
        nonce=\"dcd98b7102dd2f0e8b11d0f600bfb0c093\", uri=\"sip:biloxi.com\", \
        qop=auth, nc=00000001, cnonce=\"0a4f113b\", \
        response=\"6629fae49393a05397450978507c4ef1\"\r\n\
        Content-Length: 0\r\n\r\n";

    let msg = crate::message::Message::parse(msg).unwrap();
    let request = msg.request().unwrap();

    assert_eq!(request.method(), &Method::Register);
    assert_eq!(request.headers.via().unwrap()[0].port(), Some(5060));
    assert_eq!(request.headers.from().unwrap().display_name(), Some("Bob"));
    assert_eq!(request.headers.contact().unwrap()[0].expires(), Some(7200));

    let credentials = request.headers.authorization().unwrap();
    assert_eq!(credentials.username.as_deref(), Some("bob"));
    assert_eq!(credentials.nc, Some(1));
    assert_eq!(credentials.uri.as_ref().unwrap().domain(), "biloxi.com");
    assert!(request.faults().is_empty());
}

#[test]
fn test_parse_empty_input() {
    assert_matches!(crate::message::Message::parse(b"\r\n\r\n"), Err(crate::Error::Incomplete));
}
