use super::CommandDescriptor;

/// The LG command set: RS-232C opcode pairs and UDAP key codes.
pub(super) fn commands() -> Vec<(&'static str, CommandDescriptor)> {
    use CommandDescriptor as D;

    vec![
        ("3D_LR", D::webos(401)),
        ("3D", D::webos(400)),
        ("AbnormalRead", D::serial("k", "z", "FF")),
        ("Abnormal0", D::serial("", "z", "00").with_note("Normal (Power on and signal exist)")),
        ("Abnormal1", D::serial("", "z", "01").with_note("No signal (Power on)")),
        ("Abnormal2", D::serial("", "z", "02").with_note("Turn the monitor off by remote control")),
        ("Abnormal3", D::serial("", "z", "03").with_note("Turn the monitor off by sleep time function")),
        ("Abnormal4", D::serial("", "z", "04").with_note("Turn the monitor off by RS-232C function")),
        ("Abnormal6", D::serial("", "z", "06").with_note("AC down")),
        ("Abnormal8", D::serial("", "z", "08").with_note("Turn the monitor off by off time function")),
        ("Abnormal9", D::serial("", "z", "09").with_note("Turn the monitor off by auto off function")),
        ("AfterImgInv", D::serial("j", "p", "01")),
        ("AfterImgNorm", D::serial("j", "p", "08")),
        ("AfterImgOrbit", D::serial("j", "p", "02")),
        ("AfterImgWtWash", D::serial("j", "p", "04")),
        ("Apps", D::webos(417)),
        ("Aspect1:1(PC)", D::serial("k", "c", "09").with_webos(46)),
        ("Aspect14:9", D::serial("k", "c", "07").with_webos(46)),
        ("Aspect16:9", D::serial("k", "c", "02").with_webos(46)),
        ("Aspect4:3", D::serial("k", "c", "01").with_webos(46)),
        ("AspectFull", D::serial("k", "c", "08").with_webos(46)),
        ("AspectHoriz", D::serial("k", "c", "03").with_webos(46)),
        ("AspectStatus", D::serial("k", "c", "FF").with_webos(46)),
        ("AspectZoom1", D::serial("k", "c", "04").with_webos(46)),
        ("AspectZoom2", D::serial("k", "c", "05").with_webos(46)),
        ("AudioDesc", D::webos(407)),
        ("AutoConf(RGB)PC", D::serial("j", "u", "01")),
        ("AV", D::webos(410)),
        ("Back", D::webos(23)),
        ("BalanceLevel", D::serial("k", "t", "FF")),
        ("BalanceSet", D::ranged("k", "t", 64)),
        ("Blue", D::webos(29)),
        ("BrightLevel", D::serial("k", "h", "FF")),
        ("BrightSet", D::ranged("k", "h", 64)),
        ("Ch_Dn", D::webos(28)),
        ("Ch_Up", D::webos(27)),
        ("ColorCool", D::serial("k", "u", "01")),
        ("ColorLevel", D::serial("k", "i", "FF")),
        ("ColorNormal", D::serial("k", "u", "00")),
        ("ColorSet", D::ranged("k", "i", 64)),
        ("ColorTempLvl", D::serial("k", "u", "FF")),
        ("ColorUser", D::serial("k", "u", "03")),
        ("ColorWarm", D::serial("k", "u", "02")),
        ("ContrastLvl", D::serial("k", "g", "FF")),
        ("ContrastSet", D::ranged("k", "g", 64)),
        ("Dash", D::webos(402)),
        ("Down", D::webos(13)),
        ("EnergySave", D::webos(409)),
        ("EPG", D::webos(44)),
        ("Exit", D::webos(412)),
        ("Ext", D::webos(47)),
        ("Fave", D::webos(404)),
        ("FF", D::webos(36)),
        ("Green", D::webos(30)),
        ("Home", D::webos(21)),
        ("Info", D::webos(45)),
        ("InputAV", D::serial("k", "b", "02")),
        ("InputCmpnt1", D::serial("k", "b", "04")),
        ("InputCmpnt2", D::serial("k", "b", "05")),
        ("InputHDMI(DTV)", D::serial("k", "b", "08")),
        ("InputHDMI(PC)", D::serial("k", "b", "09")),
        ("InputRGB(DTV)", D::serial("k", "b", "06")),
        ("InputRGB(PC)", D::serial("k", "b", "07")),
        ("InternalTemp", D::serial("d", "n", "FF").with_note("The data is 1 byte long in Hexadecimal.")),
        ("LampCheck", D::serial("d", "p", "FF")),
        ("LampFault", D::serial("d", "p", "00")),
        ("LampOk", D::serial("d", "p", "01")),
        ("Left", D::webos(14)),
        ("Live", D::webos(43)),
        ("Mark", D::webos(52)),
        ("Menu", D::webos(22)),
        ("MuteStatus", D::serial("k", "e", "FF")),
        ("MuteOff", D::serial("k", "e", "01").with_webos(26)),
        ("MuteOn", D::serial("k", "e", "00").with_webos(26)),
        ("Netcast", D::webos(408)),
        ("Num0", D::serial("m", "c", "02").with_webos(2)),
        ("Num1", D::serial("m", "c", "03").with_webos(3)),
        ("Num2", D::serial("m", "c", "04").with_webos(4)),
        ("Num3", D::serial("m", "c", "05").with_webos(5)),
        ("Num4", D::serial("m", "c", "06").with_webos(6)),
        ("Num5", D::serial("m", "c", "07").with_webos(7)),
        ("Num6", D::serial("m", "c", "08").with_webos(8)),
        ("Num7", D::serial("m", "c", "09").with_webos(9)),
        ("Num8", D::serial("m", "c", "10").with_webos(10)),
        ("Num9", D::serial("m", "c", "11").with_webos(11)),
        ("OK", D::webos(20)),
        ("OSDOff", D::serial("k", "l", "00")),
        ("OSDOn", D::serial("k", "l", "01")),
        ("Pause", D::webos(34)),
        ("PIP_CH_Down", D::webos(415)),
        ("PIP_CH_Up", D::webos(414)),
        ("PIP_Switch", D::webos(416)),
        ("PIP", D::webos(48)),
        ("Play", D::webos(33)),
        ("PowerOff", D::serial("k", "a", "00").with_webos(0)),
        ("PowerOn", D::serial("k", "a", "01").with_webos(1)),
        ("PowerStatus", D::serial("k", "a", "FF")),
        ("PrevCh", D::webos(403)),
        ("ProgList", D::webos(50)),
        ("QuickMenu", D::webos(405)),
        ("REC_List", D::webos(41)),
        ("REC", D::webos(40)),
        ("Red", D::webos(31)),
        ("RemoteDisable", D::serial("k", "m", "00")),
        ("RemoteEnable", D::serial("k", "m", "01")),
        ("Repeat", D::webos(42)),
        ("Reserve", D::webos(413)),
        ("REW", D::webos(37)),
        ("Right", D::webos(15)),
        ("ScreenOff", D::serial("k", "d", "00")),
        ("ScreenOn", D::serial("k", "d", "01")),
        ("SharpLevel", D::serial("k", "k", "FF")),
        ("SharpSet", D::ranged("k", "k", 64)),
        ("SimpLink", D::webos(411)),
        ("SkipFF", D::webos(38)),
        ("SkipREW", D::webos(39)),
        ("Stop", D::webos(35)),
        ("Subtitle", D::webos(49)),
        ("Text_Opt", D::webos(406)),
        ("Text", D::webos(51)),
        ("Tile1x2", D::serial("d", "d", "12").with_note("(column x row)")),
        ("Tile1x3", D::serial("d", "d", "13").with_note("(column x row)")),
        ("Tile1x4", D::serial("d", "d", "14").with_note("(column x row)")),
        ("Tile2x2", D::serial("d", "d", "22").with_note("(column x row)")),
        ("Tile2x3", D::serial("d", "d", "23").with_note("(column x row)")),
        ("Tile2x4", D::serial("d", "d", "24").with_note("(column x row)")),
        ("Tile3x2", D::serial("d", "d", "32").with_note("(column x row)")),
        ("Tile3x3", D::serial("d", "d", "33").with_note("(column x row)")),
        ("Tile3x4", D::serial("d", "d", "34").with_note("(column x row)")),
        ("Tile4x2", D::serial("d", "d", "42").with_note("(column x row)")),
        ("Tile4x3", D::serial("d", "d", "43").with_note("(column x row)")),
        ("Tile4x4", D::serial("d", "d", "44").with_note("(column x row)")),
        ("TileID", D::ranged("d", "i", 10)),
        ("TileOff", D::serial("d", "d", "00")),
        ("TileSizeH", D::ranged("d", "g", 64)),
        ("TileSizeV", D::ranged("d", "h", 64)),
        ("TimeElapsed", D::serial("d", "l", "FF").with_note("The data means used hours. (Hexadecimal code)")),
        ("TintLevel", D::serial("k", "j", "FF")),
        ("TintSet", D::ranged("k", "j", 64)),
        ("Up", D::webos(12)),
        ("VolDn", D::webos(25)),
        ("VolLvl", D::serial("k", "f", "FF")),
        ("VolSet", D::ranged("k", "f", 64)),
        ("VolUp", D::webos(24)),
        ("Yellow", D::webos(32)),
    ]
}
