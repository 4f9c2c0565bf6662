//! Built-in default template used when no template file is given.
//!
//! A 4:3 presentation with no slides, one theme and one master carrying the
//! eleven standard layouts in their usual order. Layout placeholders either
//! carry their own position or inherit it from the master.

use crate::constants::*;
use crate::package::{ContentTypes, Package};
use deck_core::Result;

/// Names of the built-in layouts, in order.
pub const DEFAULT_LAYOUT_NAMES: [&str; 11] = [
    "Title Slide",
    "Title and Content",
    "Section Header",
    "Two Content",
    "Comparison",
    "Title Only",
    "Blank",
    "Content with Caption",
    "Picture with Caption",
    "Title and Vertical Text",
    "Vertical Title and Text",
];

/// Offset x, offset y, extent cx, extent cy.
type Rect = [i64; 4];

/// One layout placeholder: name stem, `p:ph` attributes, own position.
type PlaceholderSpec = (&'static str, &'static str, Option<Rect>);

struct LayoutSpec {
    name: &'static str,
    kind: &'static str,
    placeholders: &'static [PlaceholderSpec],
}

const TITLE: PlaceholderSpec = ("Title", r#"type="title""#, None);
const CONTENT: PlaceholderSpec = ("Content Placeholder", r#"idx="1""#, None);

const LAYOUTS: [LayoutSpec; 11] = [
    LayoutSpec {
        name: "Title Slide",
        kind: "title",
        placeholders: &[
            ("Title", r#"type="ctrTitle""#, Some([685800, 2130425, 7772400, 1470025])),
            ("Subtitle", r#"type="subTitle" idx="1""#, Some([1371600, 3886200, 6400800, 1752600])),
        ],
    },
    LayoutSpec {
        name: "Title and Content",
        kind: "obj",
        placeholders: &[TITLE, CONTENT],
    },
    LayoutSpec {
        name: "Section Header",
        kind: "secHead",
        placeholders: &[
            ("Title", r#"type="title""#, Some([722313, 4406900, 7772400, 1362075])),
            ("Text Placeholder", r#"type="body" idx="1""#, Some([722313, 2906713, 7772400, 1500187])),
        ],
    },
    LayoutSpec {
        name: "Two Content",
        kind: "twoObj",
        placeholders: &[
            TITLE,
            ("Content Placeholder", r#"sz="half" idx="1""#, Some([457200, 1600200, 4038600, 4525963])),
            ("Content Placeholder", r#"sz="half" idx="2""#, Some([4648200, 1600200, 4038600, 4525963])),
        ],
    },
    LayoutSpec {
        name: "Comparison",
        kind: "twoTxTwoObj",
        placeholders: &[
            TITLE,
            ("Text Placeholder", r#"type="body" idx="1""#, Some([457200, 1535113, 4040188, 639762])),
            ("Content Placeholder", r#"sz="half" idx="2""#, Some([457200, 2174875, 4040188, 3951288])),
            ("Text Placeholder", r#"type="body" sz="quarter" idx="3""#, Some([4645025, 1535113, 4041775, 639762])),
            ("Content Placeholder", r#"sz="quarter" idx="4""#, Some([4645025, 2174875, 4041775, 3951288])),
        ],
    },
    LayoutSpec {
        name: "Title Only",
        kind: "titleOnly",
        placeholders: &[TITLE],
    },
    LayoutSpec {
        name: "Blank",
        kind: "blank",
        placeholders: &[],
    },
    LayoutSpec {
        name: "Content with Caption",
        kind: "objTx",
        placeholders: &[
            ("Title", r#"type="title""#, Some([457200, 273050, 3008313, 1162050])),
            ("Content Placeholder", r#"idx="1""#, Some([3575050, 273050, 5111750, 5853113])),
            ("Text Placeholder", r#"type="body" sz="half" idx="2""#, Some([457200, 1435100, 3008313, 4691063])),
        ],
    },
    LayoutSpec {
        name: "Picture with Caption",
        kind: "picTx",
        placeholders: &[
            ("Title", r#"type="title""#, Some([1792288, 4800600, 5486400, 566738])),
            ("Picture Placeholder", r#"type="pic" idx="1""#, Some([1792288, 612775, 5486400, 4114800])),
            ("Text Placeholder", r#"type="body" sz="quarter" idx="2""#, Some([1792288, 5367338, 5486400, 804862])),
        ],
    },
    LayoutSpec {
        name: "Title and Vertical Text",
        kind: "vertTx",
        placeholders: &[
            TITLE,
            ("Vertical Text Placeholder", r#"type="body" orient="vert" idx="1""#, None),
        ],
    },
    LayoutSpec {
        name: "Vertical Title and Text",
        kind: "vertTitleAndTx",
        placeholders: &[
            ("Vertical Title", r#"type="title" orient="vert""#, Some([6629400, 274638, 2057400, 5851525])),
            ("Vertical Text Placeholder", r#"type="body" orient="vert" idx="1""#, Some([457200, 274638, 6019800, 5851525])),
        ],
    },
];

/// Date, footer and slide number placeholders present on every layout.
const LAYOUT_FOOTERS: [PlaceholderSpec; 3] = [
    ("Date Placeholder", r#"type="dt" sz="half" idx="10""#, None),
    ("Footer Placeholder", r#"type="ftr" sz="quarter" idx="11""#, None),
    ("Slide Number Placeholder", r#"type="sldNum" sz="quarter" idx="12""#, None),
];

const MASTER_PLACEHOLDERS: [PlaceholderSpec; 5] = [
    ("Title Placeholder", r#"type="title""#, Some([457200, 274638, 8229600, 1143000])),
    ("Text Placeholder", r#"type="body" idx="1""#, Some([457200, 1600200, 8229600, 4525963])),
    ("Date Placeholder", r#"type="dt" sz="half" idx="2""#, Some([457200, 6356350, 2133600, 365125])),
    ("Footer Placeholder", r#"type="ftr" sz="quarter" idx="3""#, Some([3124200, 6356350, 2895600, 365125])),
    ("Slide Number Placeholder", r#"type="sldNum" sz="quarter" idx="4""#, Some([6553200, 6356350, 2133600, 365125])),
];

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Build the default package.
pub fn default_package() -> Result<Package> {
    let mut package = Package::new();
    let mut content_types = ContentTypes::default();
    content_types.add_default("rels", CT_RELATIONSHIPS);
    content_types.add_default("xml", "application/xml");

    package.set_part(
        "_rels/.rels",
        rels_xml(&[
            (REL_TYPE_OFFICE_DOCUMENT, "ppt/presentation.xml".to_string()),
            (REL_TYPE_CORE_PROPERTIES, "docProps/core.xml".to_string()),
            (REL_TYPE_EXTENDED_PROPERTIES, "docProps/app.xml".to_string()),
        ]),
    );
    package.set_part("docProps/core.xml", core_xml().into_bytes());
    content_types.add_override("docProps/core.xml", CT_CORE_PROPERTIES);
    package.set_part("docProps/app.xml", app_xml().into_bytes());
    content_types.add_override("docProps/app.xml", CT_EXTENDED_PROPERTIES);

    package.set_part("ppt/presentation.xml", presentation_xml().into_bytes());
    content_types.add_override("ppt/presentation.xml", CT_PRESENTATION);
    package.set_part(
        "ppt/_rels/presentation.xml.rels",
        rels_xml(&[
            (REL_TYPE_SLIDE_MASTER, "slideMasters/slideMaster1.xml".to_string()),
            (REL_TYPE_PRES_PROPS, "presProps.xml".to_string()),
            (REL_TYPE_THEME, "theme/theme1.xml".to_string()),
        ]),
    );
    package.set_part("ppt/presProps.xml", pres_props_xml().into_bytes());
    content_types.add_override("ppt/presProps.xml", CT_PRES_PROPS);
    package.set_part("ppt/theme/theme1.xml", theme_xml().into_bytes());
    content_types.add_override("ppt/theme/theme1.xml", CT_THEME);

    package.set_part("ppt/slideMasters/slideMaster1.xml", master_xml().into_bytes());
    content_types.add_override("ppt/slideMasters/slideMaster1.xml", CT_SLIDE_MASTER);
    let mut master_rels: Vec<(&str, String)> = (1..=LAYOUTS.len())
        .map(|n| (REL_TYPE_SLIDE_LAYOUT, format!("../slideLayouts/slideLayout{}.xml", n)))
        .collect();
    master_rels.push((REL_TYPE_THEME, "../theme/theme1.xml".to_string()));
    package.set_part(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        rels_xml(&master_rels),
    );

    for (i, layout) in LAYOUTS.iter().enumerate() {
        let part = format!("ppt/slideLayouts/slideLayout{}.xml", i + 1);
        package.set_part(part.as_str(), layout_xml(layout).into_bytes());
        content_types.add_override(&part, CT_SLIDE_LAYOUT);
        package.set_part(
            format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", i + 1),
            rels_xml(&[(REL_TYPE_SLIDE_MASTER, "../slideMasters/slideMaster1.xml".to_string())]),
        );
    }

    package.set_part(CONTENT_TYPES_PART, content_types.to_xml()?);
    Ok(package)
}

fn rels_xml(targets: &[(&str, String)]) -> Vec<u8> {
    let mut rels = format!("{}\n<Relationships xmlns=\"{}\">\n", XML_DECL, NS_PACKAGE_RELATIONSHIPS);
    for (i, (rel_type, target)) in targets.iter().enumerate() {
        rels.push_str(&format!(
            "  <Relationship Id=\"rId{}\" Type=\"{}\" Target=\"{}\"/>\n",
            i + 1,
            rel_type,
            target
        ));
    }
    rels.push_str("</Relationships>");
    rels.into_bytes()
}

fn core_xml() -> String {
    format!(
        r#"{}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <dc:title>Presentation</dc:title>
  <dc:creator>deckconv</dc:creator>
</cp:coreProperties>"#,
        XML_DECL
    )
}

fn app_xml() -> String {
    format!(
        r#"{}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
  <TotalTime>0</TotalTime>
  <Application>deckconv</Application>
  <PresentationFormat>On-screen Show (4:3)</PresentationFormat>
</Properties>"#,
        XML_DECL
    )
}

fn presentation_xml() -> String {
    format!(
        r#"{}
<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">
  <p:sldMasterIdLst>
    <p:sldMasterId id="2147483648" r:id="rId1"/>
  </p:sldMasterIdLst>
  <p:sldSz cx="{}" cy="{}" type="screen4x3"/>
  <p:notesSz cx="{}" cy="{}"/>
</p:presentation>"#,
        XML_DECL,
        NS_DRAWING,
        NS_RELATIONSHIPS,
        NS_PRESENTATION,
        DEFAULT_SLIDE_WIDTH_EMU,
        DEFAULT_SLIDE_HEIGHT_EMU,
        DEFAULT_SLIDE_HEIGHT_EMU, // Notes are rotated
        DEFAULT_SLIDE_WIDTH_EMU
    )
}

fn pres_props_xml() -> String {
    format!(
        r#"{}
<p:presentationPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"/>"#,
        XML_DECL, NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
    )
}

fn theme_xml() -> String {
    format!(
        r#"{}
<a:theme xmlns:a="{}" name="Office Theme">
  <a:themeElements>
    <a:clrScheme name="Office">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
      <a:dk2><a:srgbClr val="1F497D"/></a:dk2>
      <a:lt2><a:srgbClr val="EEECE1"/></a:lt2>
      <a:accent1><a:srgbClr val="4F81BD"/></a:accent1>
      <a:accent2><a:srgbClr val="C0504D"/></a:accent2>
      <a:accent3><a:srgbClr val="9BBB59"/></a:accent3>
      <a:accent4><a:srgbClr val="8064A2"/></a:accent4>
      <a:accent5><a:srgbClr val="4BACC6"/></a:accent5>
      <a:accent6><a:srgbClr val="F79646"/></a:accent6>
      <a:hlink><a:srgbClr val="0000FF"/></a:hlink>
      <a:folHlink><a:srgbClr val="800080"/></a:folHlink>
    </a:clrScheme>
    <a:fontScheme name="Office">
      <a:majorFont>
        <a:latin typeface="Calibri"/>
        <a:ea typeface=""/>
        <a:cs typeface=""/>
      </a:majorFont>
      <a:minorFont>
        <a:latin typeface="Calibri"/>
        <a:ea typeface=""/>
        <a:cs typeface=""/>
      </a:minorFont>
    </a:fontScheme>
    <a:fmtScheme name="Office">
      <a:fillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:fillStyleLst>
      <a:lnStyleLst>
        <a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
      </a:lnStyleLst>
      <a:effectStyleLst>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
      </a:effectStyleLst>
      <a:bgFillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:bgFillStyleLst>
    </a:fmtScheme>
  </a:themeElements>
</a:theme>"#,
        XML_DECL, NS_DRAWING
    )
}

/// `p:sp` for a placeholder with shape id `id`.
fn placeholder_sp(id: usize, (stem, ph_attrs, rect): &PlaceholderSpec) -> String {
    let sp_pr = match rect {
        Some([x, y, cx, cy]) => format!(
            r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm></p:spPr>"#,
            x, y, cx, cy
        ),
        None => "<p:spPr/>".to_string(),
    };
    format!(
        r#"
      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="{}" name="{} {}"/>
          <p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>
          <p:nvPr><p:ph {}/></p:nvPr>
        </p:nvSpPr>
        {}
        <p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody>
      </p:sp>"#,
        id,
        stem,
        id - 1,
        ph_attrs,
        sp_pr
    )
}

fn sp_tree<'a>(placeholders: impl Iterator<Item = &'a PlaceholderSpec>) -> String {
    let mut tree = String::from(
        r#"<p:spTree>
      <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
      <p:grpSpPr/>"#,
    );
    for (i, spec) in placeholders.enumerate() {
        tree.push_str(&placeholder_sp(i + 2, spec));
    }
    tree.push_str("\n    </p:spTree>");
    tree
}

fn master_xml() -> String {
    let layout_ids: String = (1..=LAYOUTS.len())
        .map(|n| format!("\n    <p:sldLayoutId id=\"{}\" r:id=\"rId{}\"/>", 2147483648u32 + n as u32, n))
        .collect();
    format!(
        r#"{}
<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">
  <p:cSld>
    <p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>
    {}
  </p:cSld>
  <p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
  <p:sldLayoutIdLst>{}
  </p:sldLayoutIdLst>
</p:sldMaster>"#,
        XML_DECL,
        NS_DRAWING,
        NS_RELATIONSHIPS,
        NS_PRESENTATION,
        sp_tree(MASTER_PLACEHOLDERS.iter()),
        layout_ids
    )
}

fn layout_xml(layout: &LayoutSpec) -> String {
    format!(
        r#"{}
<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="{}" preserve="1">
  <p:cSld name="{}">
    {}
  </p:cSld>
  <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>"#,
        XML_DECL,
        NS_DRAWING,
        NS_RELATIONSHIPS,
        NS_PRESENTATION,
        layout.kind,
        layout.name,
        sp_tree(layout.placeholders.iter().chain(LAYOUT_FOOTERS.iter()))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlElement;

    #[test]
    fn test_layout_names_match_table() {
        let names: Vec<&str> = LAYOUTS.iter().map(|l| l.name).collect();
        assert_eq!(names, DEFAULT_LAYOUT_NAMES);
    }

    #[test]
    fn test_every_part_is_well_formed() {
        let package = default_package().unwrap();
        for name in package.part_names() {
            let bytes = package.part(name).unwrap();
            XmlElement::parse_bytes(bytes).unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn test_every_xml_part_has_content_type() {
        let package = default_package().unwrap();
        let types = package.content_types().unwrap();
        for name in package.part_names() {
            assert!(types.content_type(name).is_some(), "{name}");
        }
        assert_eq!(
            types.content_type("ppt/slideLayouts/slideLayout7.xml"),
            Some(CT_SLIDE_LAYOUT)
        );
    }

    #[test]
    fn test_nothing_is_unreachable() {
        let mut package = default_package().unwrap();
        assert!(package.prune_unreachable().unwrap().is_empty());
    }

    #[test]
    fn test_title_slide_layout() {
        let package = default_package().unwrap();
        let layout =
            XmlElement::parse_bytes(package.part("ppt/slideLayouts/slideLayout1.xml").unwrap()).unwrap();

        assert_eq!(layout.child("cSld").unwrap().attr("name"), Some("Title Slide"));
        let tree = layout.find(&["cSld", "spTree"]).unwrap();
        let ph_types: Vec<&str> = tree
            .children_named("sp")
            .filter_map(|sp| sp.find(&["nvSpPr", "nvPr", "ph"]))
            .map(|ph| ph.attr("type").unwrap_or("obj"))
            .collect();
        assert_eq!(ph_types, vec!["ctrTitle", "subTitle", "dt", "ftr", "sldNum"]);
    }
}
