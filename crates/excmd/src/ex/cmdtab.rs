/// What a command accepts after its name.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ArgSpec {
    /// A line range may be given.
    pub range: bool,

    /// A `!` may follow the name.
    pub bang: bool,

    /// Arguments may follow.
    pub extra: bool,

    /// `%` and `#` in the argument are replaced with file names.
    pub xfile: bool,

    /// The argument is a single file name, and wildcards in it are expanded.
    pub nospc: bool,

    /// With no range given, the whole buffer is used.
    pub default_all: bool,

    /// `|` ends the command and starts the next one.
    pub trailing_bar: bool,

    /// `"` is part of the argument, rather than starting a comment.
    pub no_comment: bool,

    /// An argument is required.
    pub needs_arg: bool,

    /// A register name may be given.
    pub register: bool,

    /// A count may follow the name.
    pub count: bool,

    /// Line 0 is allowed in the range.
    pub zero_range: bool,

    /// `CTRL-V` is kept in the argument instead of removed.
    pub keep_ctrlv: bool,
}

impl ArgSpec {
    /// A command that takes nothing.
    pub const NONE: ArgSpec = ArgSpec {
        range: false,
        bang: false,
        extra: false,
        xfile: false,
        nospc: false,
        default_all: false,
        trailing_bar: false,
        no_comment: false,
        needs_arg: false,
        register: false,
        count: false,
        zero_range: false,
        keep_ctrlv: false,
    };

    const fn range(self) -> Self {
        ArgSpec { range: true, ..self }
    }

    const fn bang(self) -> Self {
        ArgSpec { bang: true, ..self }
    }

    const fn extra(self) -> Self {
        ArgSpec { extra: true, ..self }
    }

    const fn xfile(self) -> Self {
        ArgSpec { xfile: true, ..self }
    }

    /// A single file name argument.
    const fn file1(self) -> Self {
        ArgSpec { extra: true, xfile: true, nospc: true, ..self }
    }

    const fn dflall(self) -> Self {
        ArgSpec { default_all: true, ..self }
    }

    const fn trlbar(self) -> Self {
        ArgSpec { trailing_bar: true, ..self }
    }

    const fn needarg(self) -> Self {
        ArgSpec { needs_arg: true, ..self }
    }

    const fn regstr(self) -> Self {
        ArgSpec { register: true, ..self }
    }

    const fn count(self) -> Self {
        ArgSpec { count: true, ..self }
    }

    const fn zeror(self) -> Self {
        ArgSpec { zero_range: true, ..self }
    }

    /// Arguments for mappings and abbreviations, which may contain `"` and `CTRL-V`.
    const fn mapping(self) -> Self {
        ArgSpec { extra: true, trailing_bar: true, no_comment: true, keep_ctrlv: true, ..self }
    }
}

/// Identifies a command in the table.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[allow(missing_docs)]
pub enum CommandId {
    Abbreviate,
    Args,
    Cabbrev,
    Cc,
    Cd,
    Center,
    Cf,
    Chdir,
    Cl,
    Cmap,
    Cn,
    Cnoreabbrev,
    Cnoremap,
    Copy,
    Cp,
    Cq,
    Cunabbrev,
    Cunmap,
    Delete,
    Digraphs,
    Display,
    Edit,
    Ex,
    File,
    Files,
    Global,
    Help,
    Iabbrev,
    Imap,
    Inoreabbrev,
    Inoremap,
    Iunabbrev,
    Iunmap,
    Join,
    Jumps,
    K,
    Left,
    List,
    Make,
    Map,
    Mark,
    Marks,
    Mkexrc,
    Mkvimrc,
    Move,
    Next,
    PrevFile,
    Noreabbrev,
    Noremap,
    Number,
    Pop,
    Previous,
    Print,
    Put,
    Pwd,
    Quit,
    Read,
    Redo,
    Rewind,
    Right,
    Set,
    Setkeymap,
    Shell,
    Source,
    Stop,
    Substitute,
    Suspend,
    T,
    Tag,
    Tags,
    Unabbreviate,
    Undo,
    Unmap,
    Version,
    Vglobal,
    Visual,
    Winsize,
    Wnext,
    Wq,
    Write,
    Xit,
    Yank,
    At,
    Bang,
    LShift,
    Equal,
    RShift,
    And,
}

/// An entry in the command table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CommandSpec {
    /// Full name of the command.
    pub name: &'static str,

    /// Which command this is.
    pub id: CommandId,

    /// What the command accepts.
    pub args: ArgSpec,
}

macro_rules! cmd {
    ($name: literal, $id: ident, $args: expr) => {
        CommandSpec { name: $name, id: CommandId::$id, args: $args }
    };
}

const N: ArgSpec = ArgSpec::NONE;

/// The command table.
///
/// Abbreviated names resolve to the first entry they are a prefix of, so the order here
/// decides what short names like `:d` or `:s` mean.
pub static COMMANDS: &[CommandSpec] = &[
    cmd!("abbreviate", Abbreviate, N.mapping()),
    cmd!("args", Args, N.trlbar()),
    cmd!("copy", Copy, N.range().extra().trlbar()),
    cmd!("cabbrev", Cabbrev, N.mapping()),
    cmd!("cc", Cc, N.extra().trlbar()),
    cmd!("cd", Cd, N.file1().trlbar()),
    cmd!("center", Center, N.range().extra().trlbar()),
    cmd!("cf", Cf, N.file1().trlbar()),
    cmd!("chdir", Chdir, N.file1().trlbar()),
    cmd!("cl", Cl, N.trlbar()),
    cmd!("cmap", Cmap, N.mapping()),
    cmd!("cn", Cn, N.trlbar()),
    cmd!("cnoremap", Cnoremap, N.mapping()),
    cmd!("cnoreabbrev", Cnoreabbrev, N.mapping()),
    cmd!("cp", Cp, N.trlbar()),
    cmd!("cq", Cq, N.bang().trlbar()),
    cmd!("cunabbrev", Cunabbrev, N.mapping()),
    cmd!("cunmap", Cunmap, N.mapping()),
    cmd!("delete", Delete, N.range().regstr().count().trlbar()),
    cmd!("digraphs", Digraphs, N.extra().trlbar()),
    cmd!("display", Display, N.trlbar()),
    cmd!("edit", Edit, N.bang().file1().trlbar()),
    cmd!("ex", Ex, N.bang().file1().trlbar()),
    cmd!("file", File, N.file1().trlbar()),
    cmd!("files", Files, N.trlbar()),
    cmd!("global", Global, N.range().bang().extra().dflall()),
    cmd!("help", Help, N.trlbar()),
    cmd!("iabbrev", Iabbrev, N.mapping()),
    cmd!("imap", Imap, N.mapping()),
    cmd!("inoremap", Inoremap, N.mapping()),
    cmd!("inoreabbrev", Inoreabbrev, N.mapping()),
    cmd!("iunabbrev", Iunabbrev, N.mapping()),
    cmd!("iunmap", Iunmap, N.mapping()),
    cmd!("join", Join, N.range().bang().count().trlbar()),
    cmd!("jumps", Jumps, N.trlbar()),
    cmd!("k", K, N.range().extra().needarg().trlbar()),
    cmd!("list", List, N.range().count().trlbar()),
    cmd!("left", Left, N.range().extra().trlbar()),
    cmd!("move", Move, N.range().extra().trlbar()),
    cmd!("mark", Mark, N.range().extra().needarg().trlbar()),
    cmd!("make", Make, N.extra().xfile().trlbar()),
    cmd!("map", Map, N.bang().mapping()),
    cmd!("marks", Marks, N.trlbar()),
    cmd!("mkexrc", Mkexrc, N.bang().file1().trlbar()),
    cmd!("mkvimrc", Mkvimrc, N.bang().file1().trlbar()),
    cmd!("next", Next, N.range().bang().extra().xfile().trlbar()),
    cmd!("Next", PrevFile, N.range().bang().trlbar()),
    cmd!("noremap", Noremap, N.bang().mapping()),
    cmd!("noreabbrev", Noreabbrev, N.mapping()),
    cmd!("number", Number, N.range().count().trlbar()),
    cmd!("print", Print, N.range().count().trlbar()),
    cmd!("pop", Pop, N.range().trlbar()),
    cmd!("previous", Previous, N.range().bang().trlbar()),
    cmd!("put", Put, N.range().bang().regstr().trlbar().zeror()),
    cmd!("pwd", Pwd, N.trlbar()),
    cmd!("quit", Quit, N.bang().trlbar()),
    cmd!("read", Read, N.range().bang().file1().trlbar().zeror()),
    cmd!("redo", Redo, N.trlbar()),
    cmd!("rewind", Rewind, N.bang().trlbar()),
    cmd!("right", Right, N.range().extra().trlbar()),
    cmd!("substitute", Substitute, N.range().extra()),
    cmd!("set", Set, N.extra().trlbar()),
    cmd!("setkeymap", Setkeymap, N.extra().needarg().trlbar()),
    cmd!("shell", Shell, N.trlbar()),
    cmd!("source", Source, N.bang().file1().needarg().trlbar()),
    cmd!("stop", Stop, N.bang().trlbar()),
    cmd!("suspend", Suspend, N.bang().trlbar()),
    cmd!("t", T, N.range().extra().trlbar()),
    cmd!("tag", Tag, N.range().bang().extra().trlbar()),
    cmd!("tags", Tags, N.trlbar()),
    cmd!("undo", Undo, N.trlbar()),
    cmd!("unabbreviate", Unabbreviate, N.mapping()),
    cmd!("unmap", Unmap, N.bang().mapping()),
    cmd!("vglobal", Vglobal, N.range().extra().dflall()),
    cmd!("version", Version, N.trlbar()),
    cmd!("visual", Visual, N.bang().file1().trlbar()),
    cmd!("write", Write, N.range().bang().file1().dflall().trlbar()),
    cmd!("winsize", Winsize, N.extra().needarg().trlbar()),
    cmd!("wnext", Wnext, N.range().bang().file1().dflall().trlbar()),
    cmd!("wq", Wq, N.range().bang().file1().dflall().trlbar()),
    cmd!("xit", Xit, N.range().bang().file1().dflall().trlbar()),
    cmd!("yank", Yank, N.range().regstr().count().trlbar()),
    cmd!("@", At, N.range().extra().trlbar()),
    cmd!("!", Bang, N.range().bang().extra().xfile()),
    cmd!("<", LShift, N.range().count().trlbar()),
    cmd!("=", Equal, N.range().trlbar()),
    cmd!(">", RShift, N.range().count().trlbar()),
    cmd!("&", And, N.range().extra()),
];

/// Find the first command that `name` abbreviates.
pub fn find_command(name: &str) -> Option<&'static CommandSpec> {
    if name.is_empty() {
        return None;
    }

    COMMANDS.iter().find(|spec| spec.name.starts_with(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> Option<CommandId> {
        find_command(name).map(|spec| spec.id)
    }

    #[test]
    fn test_short_names() {
        assert_eq!(id("d"), Some(CommandId::Delete));
        assert_eq!(id("s"), Some(CommandId::Substitute));
        assert_eq!(id("su"), Some(CommandId::Substitute));
        assert_eq!(id("sus"), Some(CommandId::Suspend));
        assert_eq!(id("e"), Some(CommandId::Edit));
        assert_eq!(id("w"), Some(CommandId::Write));
        assert_eq!(id("r"), Some(CommandId::Read));
        assert_eq!(id("m"), Some(CommandId::Move));
        assert_eq!(id("ma"), Some(CommandId::Mark));
        assert_eq!(id("marks"), Some(CommandId::Marks));
        assert_eq!(id("co"), Some(CommandId::Copy));
        assert_eq!(id("p"), Some(CommandId::Print));
        assert_eq!(id("pu"), Some(CommandId::Put));
        assert_eq!(id("no"), Some(CommandId::Noremap));
        assert_eq!(id("N"), Some(CommandId::PrevFile));
        assert_eq!(id("x"), Some(CommandId::Xit));
        assert_eq!(id("f"), Some(CommandId::File));
        assert_eq!(id("files"), Some(CommandId::Files));
        assert_eq!(id("di"), Some(CommandId::Digraphs));
        assert_eq!(id("dis"), Some(CommandId::Display));
        assert_eq!(id("k"), Some(CommandId::K));
        assert_eq!(id("t"), Some(CommandId::T));
        assert_eq!(id("ta"), Some(CommandId::Tag));
    }

    #[test]
    fn test_full_names() {
        for spec in COMMANDS.iter() {
            assert_eq!(find_command(spec.name), Some(spec), "{} shadowed", spec.name);
        }
    }

    #[test]
    fn test_unknown() {
        assert_eq!(id(""), None);
        assert_eq!(id("frobnicate"), None);
        assert_eq!(id("deletex"), None);
        assert_eq!(id("D"), None);
    }

    #[test]
    fn test_arg_specs() {
        let write = find_command("w").unwrap().args;
        assert!(write.range && write.bang && write.xfile && write.nospc && write.default_all);
        assert!(write.trailing_bar && !write.needs_arg);

        let delete = find_command("d").unwrap().args;
        assert!(delete.register && delete.count && !delete.extra && !delete.zero_range);

        let sub = find_command("s").unwrap().args;
        assert!(!sub.trailing_bar);

        let map = find_command("map").unwrap().args;
        assert!(map.no_comment && map.keep_ctrlv);
    }
}
