use nom::{is_space, IResult};
use std::str::from_utf8;

/// Parses a symbol name: a nonempty string containing neither whitespace
/// nor one of the symbols `','`, `']'`, `'#'`, `'%'`, `'→'`.
pub fn parse_symbol(input: &[u8]) -> IResult<&[u8], String> {
    named!(
        parse_symbol_s<&str>,
        map_res!(is_not!(" \t,]#%→"), from_utf8)
    );

    parse_symbol_s(input).map(String::from)
}

/// Parses a `'['`-delimited, `','`-separated sequence of symbol names.
pub fn parse_symbols(input: &[u8]) -> IResult<&[u8], Vec<String>> {
    do_parse!(
        input,
        tag!("[")
            >> take_while!(is_space)
            >> result:
                many0!(do_parse!(
                    opt!(tag!(","))
                        >> take_while!(is_space)
                        >> symbol: parse_symbol
                        >> take_while!(is_space)
                        >> (symbol)
                ))
            >> tag!("]")
            >> (result)
    )
}
