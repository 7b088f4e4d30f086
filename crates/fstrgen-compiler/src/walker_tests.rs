//! Unit tests for the declaration walker: plain records, access tracking,
//! anonymous aggregates, inheritance (including CRTP and lost
//! instantiations), templates, and enum index expansion.

use indoc::indoc;

use fstrgen_core::{Access, Decl, EnumDecl, EnumRepr, MemberOrigin, RecordDecl, RecordKind};

use crate::test_utils::parse;
use crate::walker::{WalkOutput, walk};

fn walk_source(source: &str) -> WalkOutput {
    let tree = parse(source);
    walk(&tree, source, "test.cpp")
}

fn record<'a>(out: &'a WalkOutput, name: &str) -> &'a RecordDecl {
    out.decls
        .iter()
        .find_map(|decl| match decl {
            Decl::Record(r) if r.name == name => Some(r),
            _ => None,
        })
        .unwrap_or_else(|| panic!("record `{name}` not found in {:?}", decl_names(out)))
}

fn enumeration<'a>(out: &'a WalkOutput, name: &str) -> &'a EnumDecl {
    out.decls
        .iter()
        .find_map(|decl| match decl {
            Decl::Enum(e) if e.name == name => Some(e),
            _ => None,
        })
        .unwrap_or_else(|| panic!("enum `{name}` not found in {:?}", decl_names(out)))
}

fn decl_names(out: &WalkOutput) -> Vec<&str> {
    out.decls.iter().map(|d| d.name()).collect()
}

fn members(record: &RecordDecl) -> Vec<(&str, &str)> {
    record
        .members
        .iter()
        .map(|m| (m.type_text.as_str(), m.name.as_str()))
        .collect()
}

#[test]
fn basic_struct_members_in_declaration_order() {
    let out = walk_source(indoc! {r#"
        struct Foo {
          int a = 32;
          int b[10] = {};
        };
    "#});

    let foo = record(&out, "Foo");
    assert_eq!(foo.kind, RecordKind::Struct);
    assert_eq!(foo.access, Access::Invalid);
    assert_eq!(members(foo), [("int", "a"), ("int[10]", "b")]);
    assert!(!foo.is_template_primary);
}

#[test]
fn insertion_point_sits_on_the_closing_brace() {
    let source = "struct Foo {\n  int a;\n};\n";
    let out = walk_source(source);

    let foo = record(&out, "Foo");
    assert_eq!(source.as_bytes()[foo.insert_at], b'}');
}

#[test]
fn multiple_declarators_each_become_a_member() {
    let out = walk_source("struct Base0 { int a, b , base0; };\n");

    let base0 = record(&out, "Base0");
    assert_eq!(
        members(base0),
        [("int", "a"), ("int", "b"), ("int", "base0")]
    );
}

#[test]
fn methods_and_friends_are_not_members() {
    let out = walk_source(indoc! {r#"
        class Rectangle {
            int width, height;
          public:
            void set_values (int,int);
            int area (void);
            friend class B;
        };
    "#});

    let rectangle = record(&out, "Rectangle");
    assert_eq!(members(rectangle), [("int", "width"), ("int", "height")]);
}

#[test]
fn static_data_members_are_included() {
    let out = walk_source(indoc! {r#"
        struct Inner {
          static int x;
          int y;
        };
    "#});

    assert_eq!(
        members(record(&out, "Inner")),
        [("int", "x"), ("int", "y")]
    );
}

#[test]
fn pointer_members_keep_the_star() {
    let out = walk_source("struct P { int* next; };\n");
    assert_eq!(members(record(&out, "P")), [("int*", "next")]);
}

#[test]
fn header_types_fall_back_to_int() {
    let out = walk_source(indoc! {r#"
        struct Base {
          std::string bname = "base";
          int a = 4;
        };
    "#});

    assert_eq!(
        members(record(&out, "Base")),
        [("int", "bname"), ("int", "a")]
    );
}

#[test]
fn nested_records_are_emitted_inner_first() {
    let out = walk_source(indoc! {r#"
        namespace a::b {
        struct Outer {
          struct Inner {
            int y;
          } foo;
        };
        }
    "#});

    assert_eq!(decl_names(&out), ["a::b::Outer::Inner", "a::b::Outer"]);
    assert_eq!(
        members(record(&out, "a::b::Outer")),
        [("struct Inner", "foo")]
    );
    assert!(record(&out, "a::b::Outer::Inner").depth > record(&out, "a::b::Outer").depth);
}

#[test]
fn inline_namespaces_qualify_without_collapsing() {
    let out = walk_source(indoc! {r#"
        namespace Test {
            namespace old_ns {
                struct S { int a{0}; } s;
            }
            inline namespace new_ns {
                struct S { int a{1}; } s;
            }
        }
    "#});

    assert_eq!(decl_names(&out), ["Test::old_ns::S", "Test::new_ns::S"]);
}

#[test]
fn anonymous_field_members_are_promoted_not_emitted() {
    let out = walk_source(indoc! {r#"
        struct Rectangle { int w; };
        class Outer {
          struct {
            int a = 12;
            int b = 24;
            Rectangle r;
          } anon;
        };
    "#});

    // The anonymous struct itself contributes no declaration record.
    assert_eq!(decl_names(&out), ["Rectangle", "Outer"]);

    let outer = record(&out, "Outer");
    assert_eq!(
        members(outer),
        [("int", "anon.a"), ("int", "anon.b"), ("Rectangle", "anon.r")]
    );
    assert!(outer
        .members
        .iter()
        .all(|m| matches!(m.origin, MemberOrigin::Promoted { ref via } if via == "anon")));
    assert_eq!(outer.members[0].argument(), "this->anon.a");
}

#[test]
fn instanceless_anonymous_union_members_stay_bare() {
    let out = walk_source(indoc! {r#"
        struct Packet {
          int tag;
          union {
            int i;
            double d;
          };
        };
    "#});

    let packet = record(&out, "Packet");
    assert_eq!(
        members(packet),
        [("int", "tag"), ("int", "i"), ("double", "d")]
    );
    assert_eq!(packet.members[1].argument(), "i");
}

#[test]
fn anonymous_global_with_instance_is_formattable() {
    let source = "struct {\n    int i;\n} obj0;\n";
    let out = walk_source(source);

    let anon = record(&out, "(unnamed struct at test.cpp:1:1)");
    assert_eq!(members(anon), [("int", "i")]);
}

#[test]
fn union_members_are_emitted_like_struct_members() {
    let out = walk_source(indoc! {r#"
        union Onion {
          int i;
          double d;
          char c;
        };
    "#});

    let onion = record(&out, "Onion");
    assert_eq!(onion.kind, RecordKind::Union);
    assert_eq!(
        members(onion),
        [("int", "i"), ("double", "d"), ("char", "c")]
    );
}

#[test]
fn base_members_are_inherited_through_this() {
    let out = walk_source(indoc! {r#"
        struct Base {
          std::string bname = "base";
          int a = 4;
        };
        struct Bar: Base {
          char name[50] = "bar";
        };
    "#});

    let bar = record(&out, "Bar");
    assert_eq!(
        members(bar),
        [("char[50]", "name"), ("int", "bname"), ("int", "a")]
    );
    assert_eq!(bar.members[0].argument(), "name");
    assert_eq!(bar.members[1].argument(), "this->bname");
    assert!(matches!(
        bar.members[1].origin,
        MemberOrigin::Inherited { ref base } if base == "Base"
    ));
}

#[test]
fn multiple_inheritance_flattens_with_duplicate_suppression() {
    let out = walk_source(indoc! {r#"
        struct Base0 { int a, b , base0; };
        struct Base1 { int c, d , base1; };
        struct Derived0 : Base0 { int a {10}, derived0; };
        struct Derived1 : Base1 { int c {21}, derived1; };
        struct Derived2 : Derived0, Derived1 { int b{42}, d{42}, derived2; };
    "#});

    let derived2 = record(&out, "Derived2");
    let names: Vec<&str> = derived2.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(
        names,
        ["b", "d", "derived2", "a", "derived0", "base0", "c", "derived1", "base1"]
    );
}

#[test]
fn crtp_bases_resolve_against_the_primary_without_looping() {
    let out = walk_source(indoc! {r#"
        namespace A {
        template <class T>
        class TBase {
         public:
          int tbase = 0;
        };
        class X1 : public TBase<X1> {
         public:
          int x1 = 0;
        };
        }
    "#});

    let x1 = record(&out, "A::X1");
    let names: Vec<&str> = x1.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["x1", "tbase"]);
}

#[test]
fn concrete_instantiation_bases_lose_their_members() {
    let out = walk_source(indoc! {r#"
        template <typename T> class X {
          public:
          T x;
        };
        class Y : public X<bool> {
          int y = 13;
        };
    "#});

    let y = record(&out, "Y");
    let names: Vec<&str> = y.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["y"]);
    assert!(!out.diagnostics.is_empty(), "expected a reachability warning");
}

#[test]
fn reachability_warning_renders_plainly() {
    let out = walk_source(indoc! {r#"
        template <typename T> class X {
          public:
          T x;
        };
        class Y : public X<bool> {
          int y = 13;
        };
    "#});

    insta::assert_snapshot!(
        out.diagnostics.printer().render(),
        @"warning: members of template base `X<bool>` are not reachable and will not be printed"
    );
}

#[test]
fn dependent_template_bases_resolve_against_the_primary() {
    let out = walk_source(indoc! {r#"
        namespace A {
            template <typename T>
            class Base {
            public:
                T x;
            };

            template <typename T>
            class Derived : public Base<T> {
            public:
                T y;
            };
        }
    "#});

    let derived = record(&out, "A::Derived<T>");
    assert!(derived.is_template_primary);
    assert_eq!(members(derived), [("<{}>", "y"), ("<{}>", "x")]);
    assert_eq!(derived.members[0].typeid_param.as_deref(), Some("T"));
    assert_eq!(derived.members[1].argument(), "this->x");
}

#[test]
fn template_primary_and_specialisation_name_forms() {
    let out = walk_source(indoc! {r#"
        template <class T>
        struct Helper {
          int value = 1;
        };

        template <>
        struct Helper <int> {
          int value = 2;
        };
    "#});

    let primary = record(&out, "Helper<T>");
    assert!(primary.is_template_primary);
    assert_eq!(primary.kind_label(), "CLASS_TEMPLATE");

    let special = record(&out, "Helper<int>");
    assert!(!special.is_template_primary);
    assert_eq!(special.kind_label(), "STRUCT_DECL");
    assert_eq!(members(special), [("int", "value")]);
}

#[test]
fn template_template_parameters_keep_applied_spellings() {
    let out = walk_source(indoc! {r#"
        template<typename T>
        class my_array {
          T x;
        };

        template<typename K, typename V, template<typename> typename C = my_array>
        struct Map
        {
            C<K> key = {};
            C<V> value = {};
        };
    "#});

    let map = record(&out, "Map<K, V, C>");
    assert_eq!(members(map), [("C<K>", "key"), ("C<V>", "value")]);
    assert!(map.members.iter().all(|m| m.typeid_param.is_none()));
}

#[test]
fn deep_template_members_are_skipped_with_a_warning() {
    let out = walk_source(indoc! {r#"
        template<typename K, typename T>
        struct Map {
          std::map<K, T> map1;
          std::map<K, Obj<T>> map2;
          std::map<K, std::vector<Obj<T>>> map3;
        };
    "#});

    let map = record(&out, "Map<K, T>");
    assert_eq!(members(map), [("int", "map1"), ("int", "map2")]);
    assert!(!out.diagnostics.is_empty(), "expected a skipped-member warning");
}

#[test]
fn local_classes_are_not_emitted() {
    let out = walk_source(indoc! {r#"
        int main() {
          struct Local {
            int x = 0;
          } loc;
          return 0;
        }
    "#});

    assert!(out.decls.is_empty());
}

#[test]
fn record_marker_makes_rerun_skip_the_record() {
    let out = walk_source(indoc! {r#"
        struct Foo {
          int a;
        // Generated to_string for PUBLIC STRUCT_DECL Foo
          public:
          auto to_string() const {
            return fstr::format(R"( Foo: int a={}
        )", a);
          }
        };
    "#});

    assert!(out.decls.is_empty());
}

#[test]
fn enum_marker_makes_rerun_skip_the_enum() {
    let out = walk_source(indoc! {r#"
        enum class Color1 { RED = -12 };
        // Generated formatter for INVALID enum Color1 of type INT scoped
    "#});

    assert!(out.decls.is_empty());
}

#[test]
fn enum_indices_expand_with_implicit_increment() {
    let out = walk_source("enum class Numbers : int { one = 1, two, three, many = 127 };\n");

    let numbers = enumeration(&out, "Numbers");
    assert!(numbers.scoped);
    assert_eq!(numbers.repr, EnumRepr::Int);
    let values: Vec<(&str, i128)> = numbers
        .enumerators
        .iter()
        .map(|e| (e.name.as_str(), e.value))
        .collect();
    assert_eq!(
        values,
        [("one", 1), ("two", 2), ("three", 3), ("many", 127)]
    );
}

#[test]
fn enum_insertion_point_is_after_the_closing_line() {
    let source = "enum class Numbers : int { one = 1 };\nint x;\n";
    let out = walk_source(source);

    let numbers = enumeration(&out, "Numbers");
    assert_eq!(numbers.insert_at, source.find('\n').unwrap() + 1);
}

#[test]
fn unscoped_enum_without_base_reports_uint_when_non_negative() {
    let out = walk_source("enum dir { left = 'l', right = 'r' };\n");

    let dir = enumeration(&out, "dir");
    assert!(!dir.scoped);
    assert_eq!(dir.repr, EnumRepr::UInt);
    assert_eq!(dir.enumerators[0].value, 108);
    assert_eq!(dir.enumerators[1].value, 114);
}

#[test]
fn unscoped_enum_with_negative_values_reports_int() {
    let out = walk_source("enum Color2 { RED = -12, GREEN = 7, BLUE = 15 };\n");
    assert_eq!(enumeration(&out, "Color2").repr, EnumRepr::Int);
}

#[test]
fn bool_underlying_enum_wraps_to_minus_one() {
    let out = walk_source("enum class Binary : bool { ONE, TWO };\n");

    let binary = enumeration(&out, "Binary");
    assert_eq!(binary.repr, EnumRepr::Bool);
    let values: Vec<i128> = binary.enumerators.iter().map(|e| e.value).collect();
    assert_eq!(values, [0, -1]);
}

#[test]
fn unevaluable_initialisers_fall_back_to_implicit_increment() {
    let out = walk_source(indoc! {r#"
        enum class MaxUsedAsInvalid : std::uint8_t {
          ONE,
          TWO = 63,
          INVALID = std::numeric_limits<std::uint8_t>::max()
        };
    "#});

    let max_used = enumeration(&out, "MaxUsedAsInvalid");
    // Unrecognised underlying spelling falls back to INT.
    assert_eq!(max_used.repr, EnumRepr::Int);
    let values: Vec<i128> = max_used.enumerators.iter().map(|e| e.value).collect();
    assert_eq!(values, [0, 63, 64]);
}

#[test]
fn shift_initialisers_evaluate() {
    let out = walk_source(indoc! {r#"
        enum class Numbers2 : int {
          one = 1 << 1,
          two = 1 << 2,
          three = 1 << 3,
          many = 1 << 30,
        };
    "#});

    let values: Vec<i128> = enumeration(&out, "Numbers2")
        .enumerators
        .iter()
        .map(|e| e.value)
        .collect();
    assert_eq!(values, [2, 4, 8, 1 << 30]);
}

#[test]
fn public_nested_enum_hoists_past_the_record() {
    let source = indoc! {r#"
        struct Xstruct {
          enum dir { left = 'l', right = 'r' };
          enum class cdir { left = 'l', right = 'r' };
        };
    "#};
    let out = walk_source(source);

    let dir = enumeration(&out, "Xstruct::dir");
    assert_eq!(dir.access, Access::Public);
    assert_eq!(dir.local_name, "Xstruct::dir");
    assert_eq!(dir.case_prefix(), "Xstruct::");
    assert_eq!(dir.insert_at, source.len());

    let cdir = enumeration(&out, "Xstruct::cdir");
    assert_eq!(cdir.case_prefix(), "Xstruct::cdir::");
    assert_eq!(cdir.insert_at, dir.insert_at);
}

#[test]
fn private_nested_enum_is_fully_qualified_for_specialisation() {
    let out = walk_source(indoc! {r#"
        class Xclass {
          enum dir { left = 'l', right = 'r' };
        };
    "#});

    let dir = enumeration(&out, "Xclass::dir");
    assert_eq!(dir.access, Access::Private);
    assert_eq!(dir.local_name, "Xclass::dir");
}

#[test]
fn namespace_scope_enum_stays_local() {
    let out = walk_source(indoc! {r#"
        namespace Xnamespace {
          enum dir { left = 'l', right = 'r' };
        }
    "#});

    let dir = enumeration(&out, "Xnamespace::dir");
    assert_eq!(dir.access, Access::Invalid);
    assert_eq!(dir.local_name, "dir");
    assert_eq!(dir.case_prefix(), "");
}

#[test]
fn enums_inside_templates_are_skipped_with_a_warning() {
    let out = walk_source("template <typename T> struct Box { enum Tag { A }; };\n");

    assert!(out.decls.iter().all(|d| matches!(d, Decl::Record(_))));
    assert!(!out.diagnostics.is_empty());
}
