use pretty_assertions::assert_eq;

use crate::{error::Result, Tag, TagType};

#[test]
fn pretty_dump() -> Result<()> {
    let root = Tag::new_compound(vec![
        Tag::new_string("Bananrama").with_name("name"),
        Tag::new_list(TagType::Int, vec![Tag::new_int(1)?, Tag::new_int(2)?])?
            .with_name("scores"),
        Tag::new_compound(vec![Tag::new_long(-1)?.with_name("seed")])?.with_name("data"),
        Tag::new_byte_array(vec![1, -1])?.with_name("bytes"),
        Tag::new_list(TagType::End, vec![])?.with_name("nothing"),
        Tag::new_double(0.5).with_name("d"),
    ])?
    .with_name("hello world");

    let expected = "\
TAG_Compound('hello world'): 6 entries
{
  TAG_String('name'): Bananrama
  TAG_List('scores'): 2 entries of TAG_Int
  [
    TAG_Int(None): 1
    TAG_Int(None): 2
  ]
  TAG_Compound('data'): 1 entry
  {
    TAG_Long('seed'): -1
  }
  TAG_Byte_Array('bytes'): 2 bytes [1, -1]
  TAG_List('nothing'): 0 entries
  [
  ]
  TAG_Double('d'): 0.5
}";

    assert_eq!(root.to_string(), expected);
    Ok(())
}

#[test]
fn scalar_root() -> Result<()> {
    assert_eq!(Tag::new_short(7)?.with_name("s").to_string(), "TAG_Short('s'): 7");
    assert_eq!(Tag::new_string("").to_string(), "TAG_String(''): ");
    Ok(())
}

#[test]
fn int_and_long_arrays() -> Result<()> {
    assert_eq!(
        Tag::new_int_array(vec![3, 4, 5])?.to_string(),
        "TAG_Int_Array(''): 3 ints [3, 4, 5]"
    );
    assert_eq!(
        Tag::new_long_array(vec![])?.to_string(),
        "TAG_Long_Array(''): 0 longs []"
    );
    Ok(())
}

#[test]
fn list_of_compounds() -> Result<()> {
    let list = Tag::new_list(
        TagType::Compound,
        vec![Tag::new_compound(vec![Tag::new_byte(1)?.with_name("a")])?],
    )?;

    let expected = "\
TAG_List(''): 1 entry of TAG_Compound
[
  TAG_Compound(None): 1 entry
  {
    TAG_Byte('a'): 1
  }
]";
    assert_eq!(list.to_string(), expected);
    Ok(())
}

#[test]
fn strings_stay_on_one_line() -> Result<()> {
    let root = Tag::new_compound(vec![
        Tag::new_string("line one\nline two\t\u{1b}").with_name("motd"),
        Tag::new_string(r"C:\saves").with_name("path\r"),
    ])?;

    let expected = r"TAG_Compound(''): 2 entries
{
  TAG_String('motd'): line one\nline two\t\u{1b}
  TAG_String('path\r'): C:\\saves
}";
    assert_eq!(root.to_string(), expected);
    assert_eq!(root.to_string().lines().count(), 4);
    Ok(())
}
